// ============================================================
// Layer 5 — ML / Model Layer (Burn)
// ============================================================
// All model, loss and training code lives here.
//
// What's in this layer:
//
//   model.rs      — The convolutional autoencoder
//                   • Encoder: three stride-2 convolutions
//                     (32 → 64 → 128 channels) and a linear
//                     dense bottleneck of `latent_dims`
//                   • Decoder: dense + reshape, three stride-2
//                     transposed convolutions and a sigmoid
//                     output convolution
//                   • Binary cross-entropy and binary accuracy
//
//   trainer.rs    — The training loop
//                   Forward pass, loss, backward pass, Adam
//                   step and per-epoch metrics
//
//   inferencer.rs — Forward passes on the trained model
//                   Latent coordinates, reconstructions and
//                   single-point decoding
//
// Reference: Burn Book §3 (Building Blocks)
//            Burn Book §5 (Training)

/// Convolutional autoencoder architecture
pub mod model;

/// Mini-batch training loop
pub mod trainer;

/// Encoding, reconstruction and decoding helpers
pub mod inferencer;
