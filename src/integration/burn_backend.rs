//! Burn inference backend producing darknet-style proposals.
//!
//! A [`BurnModel`] maps a normalized `[1, 3, H, W]` frame tensor to a `[cells, 5 + classes]`
//! output tensor laid out like a darknet/YOLO layer. [`BurnDetector`] packs video frames
//! into that input and turns the output rows into [`RawProposal`]s.
//!
//! # Example
//!
//! ```ignore
//! use burn::backend::NdArray;
//! use highlight_track::integration::{BurnDetector, BurnModel};
//! use highlight_track::HighlightPipeline;
//!
//! let model = MarineYolo::load("weights.mpk");
//! let mut detector = BurnDetector::<NdArray, _>::new(model, Default::default());
//! let mut pipeline = HighlightPipeline::with_default_config()?;
//! pipeline.process_frame(&mut detector, &rgb_bytes, 1920, 1056, 0.0)?;
//! ```

use burn::prelude::*;
use burn::tensor::Tensor;
use log::trace;
use ndarray::Array2;
use thiserror::Error;

use super::ProposalSource;
use crate::detection::{RawProposal, proposals_from_darknet};

const CHANNELS: usize = 3;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BurnDetectorError {
    /// Frame size differs from the size the network was built for.
    #[error("frame is {got:?} but the model expects {expected:?} (width, height)")]
    FrameSize {
        expected: (u32, u32),
        got: (u32, u32),
    },
    /// Byte buffer does not hold one packed RGB frame.
    #[error("expected {expected} bytes of packed RGB, got {got}")]
    InputLength { expected: usize, got: usize },
    /// Network output could not be read back as darknet rows.
    #[error("unusable network output: {0}")]
    Output(String),
}

/// A detection network built with Burn.
pub trait BurnModel<B: Backend>: Send + Sync {
    /// Run the network on a `[1, 3, height, width]` tensor scaled to `[0, 1]`.
    ///
    /// Returns one row per output cell: `[cx, cy, w, h, objectness, class scores...]`,
    /// box values normalized to the frame size.
    fn forward(&self, input: Tensor<B, 4>) -> Tensor<B, 2>;

    /// Frame size (width, height) the network accepts.
    fn input_size(&self) -> (u32, u32) {
        (1920, 1056)
    }
}

/// Runs a [`BurnModel`] over packed RGB frames.
pub struct BurnDetector<B: Backend, M: BurnModel<B>> {
    model: M,
    device: B::Device,
}

impl<B: Backend, M: BurnModel<B>> BurnDetector<B, M> {
    pub fn new(model: M, device: B::Device) -> Self {
        Self { model, device }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Convert packed `HWC` RGB bytes into a `[1, 3, H, W]` tensor scaled to `[0, 1]`.
    pub fn preprocess(
        &self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Tensor<B, 4>, BurnDetectorError> {
        let expected = self.model.input_size();
        if (width, height) != expected {
            return Err(BurnDetectorError::FrameSize {
                expected,
                got: (width, height),
            });
        }

        let (w, h) = (width as usize, height as usize);
        let expected_len = w * h * CHANNELS;
        if input.len() != expected_len {
            return Err(BurnDetectorError::InputLength {
                expected: expected_len,
                got: input.len(),
            });
        }

        let data: Vec<f32> = input.iter().map(|&x| x as f32 / 255.0).collect();
        let tensor = Tensor::<B, 1>::from_floats(data.as_slice(), &self.device)
            .reshape([1, h, w, CHANNELS])
            .permute([0, 3, 1, 2]);
        Ok(tensor)
    }

    /// Read a `[cells, 5 + classes]` output tensor back as proposals.
    pub fn postprocess(&self, output: Tensor<B, 2>) -> Result<Vec<RawProposal>, BurnDetectorError> {
        let [cells, columns] = output.dims();
        let values = output
            .into_data()
            .convert::<f32>()
            .to_vec::<f32>()
            .map_err(|e| BurnDetectorError::Output(format!("{e:?}")))?;
        let rows = Array2::from_shape_vec((cells, columns), values)
            .map_err(|e| BurnDetectorError::Output(e.to_string()))?;
        trace!("burn model produced {cells} cells of width {columns}");
        Ok(proposals_from_darknet(rows.view()))
    }
}

impl<B: Backend, M: BurnModel<B>> ProposalSource for BurnDetector<B, M> {
    type Error = BurnDetectorError;

    fn propose(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<RawProposal>, Self::Error> {
        let tensor = self.preprocess(input, width, height)?;
        self.postprocess(self.model.forward(tensor))
    }
}

#[cfg(all(test, feature = "burn-backend"))]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::integration::{HighlightPipeline, PipelineConfig};
    use burn::backend::NdArray;
    use std::sync::Mutex;

    type TestBackend = NdArray;

    /// Emits one confident box and one weak box, and records the input shape.
    struct FixedModel {
        seen: Mutex<Option<[usize; 4]>>,
    }

    impl FixedModel {
        fn new() -> Self {
            Self {
                seen: Mutex::new(None),
            }
        }
    }

    impl BurnModel<TestBackend> for FixedModel {
        fn forward(&self, input: Tensor<TestBackend, 4>) -> Tensor<TestBackend, 2> {
            *self.seen.lock().unwrap() = Some(input.dims());
            Tensor::from_floats(
                [
                    [0.5f32, 0.5, 0.5, 0.5, 0.99, 0.1, 0.9],
                    [0.1, 0.1, 0.25, 0.5, 0.99, 0.2, 0.3],
                ],
                &input.device(),
            )
        }

        fn input_size(&self) -> (u32, u32) {
            (8, 4)
        }
    }

    fn detector() -> BurnDetector<TestBackend, FixedModel> {
        BurnDetector::new(FixedModel::new(), Default::default())
    }

    #[test]
    fn test_preprocess_layout() {
        let detector = detector();
        // top-left pixel red, everything else black
        let mut frame = vec![0u8; 8 * 4 * 3];
        frame[0] = 255;
        let tensor = detector.preprocess(&frame, 8, 4).unwrap();
        assert_eq!(tensor.dims(), [1, 3, 4, 8]);

        let values = tensor.into_data().to_vec::<f32>().unwrap();
        assert_eq!(values[0], 1.0);
        // green plane starts after one full channel
        assert_eq!(values[8 * 4], 0.0);
        assert_eq!(values.iter().sum::<f32>(), 1.0);
    }

    #[test]
    fn test_preprocess_rejects_bad_input() {
        let detector = detector();
        let err = detector.preprocess(&[0u8; 10], 8, 4).unwrap_err();
        assert_eq!(err, BurnDetectorError::InputLength { expected: 96, got: 10 });

        let err = detector.preprocess(&[0u8; 96], 4, 8).unwrap_err();
        assert!(matches!(err, BurnDetectorError::FrameSize { .. }));
    }

    #[test]
    fn test_propose_reads_darknet_rows() {
        let mut detector = detector();
        let proposals = detector.propose(&[0u8; 96], 8, 4).unwrap();
        assert_eq!(proposals.len(), 2);
        assert_eq!(proposals[0].bbox, [0.5, 0.5, 0.5, 0.5]);
        assert_eq!(proposals[0].best_class(), Some((1, 0.9)));
        assert_eq!(*detector.model().seen.lock().unwrap(), Some([1, 3, 4, 8]));
    }

    #[test]
    fn test_frame_through_pipeline() {
        let mut detector = detector();
        let mut pipeline = HighlightPipeline::new(PipelineConfig::default()).unwrap();

        let frame = pipeline
            .process_frame(&mut detector, &[0u8; 96], 8, 4, 0.0)
            .unwrap();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame.class_ids(), vec![1]);

        let err = pipeline
            .process_frame(&mut detector, &[0u8; 12], 8, 4, 0.5)
            .unwrap_err();
        assert!(matches!(err, Error::Detector(_)));

        let out = pipeline.finish(30.0, None).unwrap();
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].track_ids, vec![Some(0)]);
        assert_eq!(out.clips.len(), 1);
    }
}
