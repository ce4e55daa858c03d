use burn::{
    nn::{
        conv::{Conv2d, Conv2dConfig, ConvTranspose2d, ConvTranspose2dConfig},
        Linear, LinearConfig, PaddingConfig2d,
    },
    prelude::*,
    tensor::activation::{relu, sigmoid},
};
use serde::{Deserialize, Serialize};

/// Channels after the last encoder convolution / before the first decoder deconvolution
pub const BOTTLENECK_CHANNELS: usize = 128;

/// Each stride-2 stage halves (encoder) or doubles (decoder) the spatial size
pub const DOWNSAMPLE_FACTOR: usize = 8;

const KERNEL: [usize; 2] = [3, 3];

/// Predictions are clamped away from 0 and 1 before taking logs
const BCE_EPSILON: f64 = 1e-7;

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally — do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct GlyphAutoencoderConfig {
    pub image_height: usize,
    pub image_width:  usize,
    pub latent_dims:  usize,
}

impl GlyphAutoencoderConfig {
    fn grid(&self) -> (usize, usize) {
        (self.image_height / DOWNSAMPLE_FACTOR, self.image_width / DOWNSAMPLE_FACTOR)
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> GlyphAutoencoder<B> {
        GlyphAutoencoder {
            encoder: self.init_encoder(device),
            decoder: self.init_decoder(device),
        }
    }

    pub fn init_encoder<B: Backend>(&self, device: &B::Device) -> Encoder<B> {
        let (gh, gw) = self.grid();
        Encoder {
            conv1: strided_conv([1, 32], device),
            conv2: strided_conv([32, 64], device),
            conv3: strided_conv([64, BOTTLENECK_CHANNELS], device),
            dense: LinearConfig::new(BOTTLENECK_CHANNELS * gh * gw, self.latent_dims).init(device),
        }
    }

    pub fn init_decoder<B: Backend>(&self, device: &B::Device) -> Decoder<B> {
        let (gh, gw) = self.grid();
        Decoder {
            dense:       LinearConfig::new(self.latent_dims, BOTTLENECK_CHANNELS * gh * gw).init(device),
            deconv1:     strided_deconv([BOTTLENECK_CHANNELS, 128], device),
            deconv2:     strided_deconv([128, 64], device),
            deconv3:     strided_deconv([64, 32], device),
            output:      Conv2dConfig::new([32, 1], KERNEL)
                .with_padding(PaddingConfig2d::Explicit(1, 1))
                .init(device),
            grid_height: gh,
            grid_width:  gw,
        }
    }

    /// Layer-by-layer description of the decoder, exported next to
    /// its weights so a web runtime can rebuild the graph.
    pub fn decoder_topology(&self) -> DecoderTopology {
        let (gh, gw) = self.grid();
        let units = BOTTLENECK_CHANNELS * gh * gw;
        let deconv = |name: &str, filters| LayerSpec {
            name:       name.to_string(),
            kind:       LayerKind::ConvTranspose2d,
            units:      None,
            filters:    Some(filters),
            kernel:     Some(KERNEL),
            stride:     Some([2, 2]),
            shape:      None,
            activation: Activation::Relu,
        };
        DecoderTopology {
            input_dims:   self.latent_dims,
            output_shape: [1, self.image_height, self.image_width],
            layers: vec![
                LayerSpec {
                    name:       "dense".into(),
                    kind:       LayerKind::Dense,
                    units:      Some(units),
                    filters:    None,
                    kernel:     None,
                    stride:     None,
                    shape:      None,
                    activation: Activation::Relu,
                },
                LayerSpec {
                    name:       "reshape".into(),
                    kind:       LayerKind::Reshape,
                    units:      None,
                    filters:    None,
                    kernel:     None,
                    stride:     None,
                    shape:      Some([BOTTLENECK_CHANNELS, gh, gw]),
                    activation: Activation::Linear,
                },
                deconv("deconv1", 128),
                deconv("deconv2", 64),
                deconv("deconv3", 32),
                LayerSpec {
                    name:       "output".into(),
                    kind:       LayerKind::Conv2d,
                    units:      None,
                    filters:    Some(1),
                    kernel:     Some(KERNEL),
                    stride:     Some([1, 1]),
                    shape:      None,
                    activation: Activation::Sigmoid,
                },
            ],
        }
    }
}

/// 3x3 convolution, stride 2, padding 1: halves height and width
fn strided_conv<B: Backend>(channels: [usize; 2], device: &B::Device) -> Conv2d<B> {
    Conv2dConfig::new(channels, KERNEL)
        .with_stride([2, 2])
        .with_padding(PaddingConfig2d::Explicit(1, 1))
        .init(device)
}

/// 3x3 transposed convolution, stride 2: (n-1)*2 - 2 + 3 + 1 = 2n
fn strided_deconv<B: Backend>(channels: [usize; 2], device: &B::Device) -> ConvTranspose2d<B> {
    ConvTranspose2dConfig::new(channels, KERNEL)
        .with_stride([2, 2])
        .with_padding([1, 1])
        .with_padding_out([1, 1])
        .init(device)
}

// ─── Encoder ──────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct Encoder<B: Backend> {
    pub conv1: Conv2d<B>,
    pub conv2: Conv2d<B>,
    pub conv3: Conv2d<B>,
    pub dense: Linear<B>,
}

impl<B: Backend> Encoder<B> {
    /// images: [batch, 1, H, W] → latent: [batch, latent_dims]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let x = relu(self.conv1.forward(images));
        let x = relu(self.conv2.forward(x));
        let x = relu(self.conv3.forward(x)); // [batch, 128, H/8, W/8]
        let [batch, c, h, w] = x.dims();
        // Linear bottleneck: no activation on the latent code
        self.dense.forward(x.reshape([batch, c * h * w]))
    }
}

// ─── Decoder ──────────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct Decoder<B: Backend> {
    pub dense:       Linear<B>,
    pub deconv1:     ConvTranspose2d<B>,
    pub deconv2:     ConvTranspose2d<B>,
    pub deconv3:     ConvTranspose2d<B>,
    pub output:      Conv2d<B>,
    pub grid_height: usize,
    pub grid_width:  usize,
}

impl<B: Backend> Decoder<B> {
    /// latent: [batch, latent_dims] → images: [batch, 1, H, W] in (0, 1)
    pub fn forward(&self, latent: Tensor<B, 2>) -> Tensor<B, 4> {
        let [batch, _] = latent.dims();
        let x = relu(self.dense.forward(latent))
            .reshape([batch, BOTTLENECK_CHANNELS, self.grid_height, self.grid_width]);
        let x = relu(self.deconv1.forward(x));
        let x = relu(self.deconv2.forward(x));
        let x = relu(self.deconv3.forward(x));
        sigmoid(self.output.forward(x))
    }
}

// ─── Autoencoder ──────────────────────────────────────────────────────────────
#[derive(Module, Debug)]
pub struct GlyphAutoencoder<B: Backend> {
    pub encoder: Encoder<B>,
    pub decoder: Decoder<B>,
}

pub struct AutoencoderOutput<B: Backend> {
    pub loss:            Tensor<B, 1>,
    pub reconstructions: Tensor<B, 4>,
}

impl<B: Backend> GlyphAutoencoder<B> {
    /// images: [batch, 1, H, W] → reconstructions of the same shape
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 4> {
        self.decoder.forward(self.encoder.forward(images))
    }

    /// Forward pass plus binary cross-entropy against the input itself.
    pub fn forward_loss(&self, images: Tensor<B, 4>) -> AutoencoderOutput<B> {
        let reconstructions = self.forward(images.clone());
        let loss = binary_cross_entropy(reconstructions.clone(), images);
        AutoencoderOutput { loss, reconstructions }
    }
}

/// Mean BCE = -mean( t*log(p) + (1-t)*log(1-p) )
pub fn binary_cross_entropy<B: Backend, const D: usize>(
    predictions: Tensor<B, D>,
    targets:     Tensor<B, D>,
) -> Tensor<B, 1> {
    let p = predictions.clamp(BCE_EPSILON, 1.0 - BCE_EPSILON);
    (targets.clone() * p.clone().log()
        + targets.neg().add_scalar(1.0) * p.neg().add_scalar(1.0).log())
    .neg()
    .mean()
}

/// Fraction of elements where (prediction > 0.5) equals the binary target
pub fn binary_accuracy<B: Backend, const D: usize>(
    predictions: Tensor<B, D>,
    targets:     Tensor<B, D>,
) -> Tensor<B, 1> {
    let thresholded = predictions.greater_elem(0.5).float();
    (thresholded - targets).abs().lower_elem(0.5).float().mean()
}

// ─── Topology export ──────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Dense,
    Reshape,
    ConvTranspose2d,
    Conv2d,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Activation {
    Linear,
    Relu,
    Sigmoid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Field name of the layer in the exported weight record
    pub name:       String,
    pub kind:       LayerKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units:      Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters:    Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernel:     Option<[usize; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stride:     Option<[usize; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape:      Option<[usize; 3]>,
    pub activation: Activation,
}

/// Decoder graph as consumed by the web conversion step.
/// Tensors are channels-first: [channels, height, width].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecoderTopology {
    pub input_dims:   usize,
    pub output_shape: [usize; 3],
    pub layers:       Vec<LayerSpec>,
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn ones_and_zeros(device: &<TestBackend as Backend>::Device) -> Tensor<TestBackend, 4> {
        Tensor::from_data(
            TensorData::new(vec![1.0f32, 0.0, 0.0, 1.0], [1, 1, 2, 2]),
            device,
        )
    }

    #[test]
    fn test_autoencoder_output_shape_equals_input_shape() {
        let device = Default::default();
        let model  = GlyphAutoencoderConfig::new(64, 64, 2).init::<TestBackend>(&device);
        let input  = Tensor::<TestBackend, 4>::zeros([2, 1, 64, 64], &device);
        let output = model.forward(input.clone());
        assert_eq!(output.dims(), input.dims());
    }

    #[test]
    fn test_model_summary_lists_both_halves() {
        let device  = Default::default();
        let model   = GlyphAutoencoderConfig::new(64, 64, 2).init::<TestBackend>(&device);
        let summary = format!("{model}");
        assert!(summary.contains("encoder"), "{summary}");
        assert!(summary.contains("decoder"), "{summary}");
        assert!(model.num_params() > 0);
    }

    #[test]
    fn test_non_square_images_round_trip_shape() {
        let device = Default::default();
        let model  = GlyphAutoencoderConfig::new(16, 24, 3).init::<TestBackend>(&device);
        let input  = Tensor::<TestBackend, 4>::ones([1, 1, 16, 24], &device);
        assert_eq!(model.forward(input).dims(), [1, 1, 16, 24]);
    }

    #[test]
    fn test_encoder_emits_latent_dims() {
        let device = Default::default();
        let cfg    = GlyphAutoencoderConfig::new(32, 32, 2);
        let enc    = cfg.init_encoder::<TestBackend>(&device);
        let z      = enc.forward(Tensor::zeros([5, 1, 32, 32], &device));
        assert_eq!(z.dims(), [5, 2]);
    }

    #[test]
    fn test_decoder_outputs_probabilities() {
        let device = Default::default();
        let dec    = GlyphAutoencoderConfig::new(16, 16, 2).init_decoder::<TestBackend>(&device);
        let z      = Tensor::<TestBackend, 2>::from_data(
            TensorData::new(vec![3.0f32, -2.0], [1, 2]),
            &device,
        );
        let pixels: Vec<f32> = dec.forward(z).into_data().to_vec().unwrap();
        assert_eq!(pixels.len(), 16 * 16);
        assert!(pixels.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_bce_is_near_zero_for_perfect_prediction() {
        let device = Default::default();
        let t      = ones_and_zeros(&device);
        let loss   = binary_cross_entropy(t.clone(), t).into_scalar().elem::<f64>();
        assert!(loss < 1e-5, "loss was {loss}");
    }

    #[test]
    fn test_bce_is_ln2_for_half_prediction() {
        let device = Default::default();
        let t      = ones_and_zeros(&device);
        let p      = Tensor::<TestBackend, 4>::full([1, 1, 2, 2], 0.5, &device);
        let loss   = binary_cross_entropy(p, t).into_scalar().elem::<f64>();
        assert!((loss - std::f64::consts::LN_2).abs() < 1e-5);
    }

    #[test]
    fn test_binary_accuracy_counts_thresholded_matches() {
        let device = Default::default();
        let t      = ones_and_zeros(&device);
        // 0.9 → 1 (match), 0.2 → 0 (match), 0.7 → 1 (miss), 0.6 → 1 (match)
        let p = Tensor::<TestBackend, 4>::from_data(
            TensorData::new(vec![0.9f32, 0.2, 0.7, 0.6], [1, 1, 2, 2]),
            &device,
        );
        let acc = binary_accuracy(p, t).into_scalar().elem::<f64>();
        assert!((acc - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_topology_matches_configuration() {
        let topo = GlyphAutoencoderConfig::new(64, 64, 2).decoder_topology();
        assert_eq!(topo.input_dims, 2);
        assert_eq!(topo.output_shape, [1, 64, 64]);
        assert_eq!(topo.layers.len(), 6);
        assert_eq!(topo.layers[0].units, Some(128 * 8 * 8));
        assert_eq!(topo.layers[1].shape, Some([128, 8, 8]));
        assert_eq!(topo.layers[5].activation, Activation::Sigmoid);
    }
}
