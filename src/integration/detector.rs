//! Trait for object detection inference backends.

use ndarray::{Array2, ArrayView2};

use crate::detection::{RawProposal, proposals_from_darknet};

/// Trait for object detection inference backends.
///
/// Implement this trait to connect any detection network to the pipeline. The
/// backend returns raw, unfiltered proposals; thresholding and NMS happen in
/// [`DetectionReducer`](crate::detection::DetectionReducer).
///
/// # Example
///
/// ```ignore
/// use highlight_track::{ProposalSource, RawProposal};
///
/// struct MyDetector {
///     // Your model here
/// }
///
/// impl ProposalSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn propose(&mut self, input: &[u8], width: u32, height: u32) -> Result<Vec<RawProposal>, Self::Error> {
///         // Run inference and return raw proposals
///         Ok(vec![])
///     }
/// }
/// ```
pub trait ProposalSource {
    /// Error type for detection failures.
    type Error;

    /// Run inference on raw image data.
    ///
    /// # Arguments
    /// * `input` - Raw image bytes (format depends on implementation)
    /// * `width` - Image width in pixels
    /// * `height` - Image height in pixels
    fn propose(
        &mut self,
        input: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<RawProposal>, Self::Error>;
}

/// Helper trait for converting model-specific outputs to raw proposals.
pub trait IntoProposals {
    fn into_proposals(self) -> Vec<RawProposal>;
}

impl IntoProposals for Vec<RawProposal> {
    fn into_proposals(self) -> Vec<RawProposal> {
        self
    }
}

/// Darknet/YOLO layer output, one row per cell.
impl IntoProposals for ArrayView2<'_, f32> {
    fn into_proposals(self) -> Vec<RawProposal> {
        proposals_from_darknet(self)
    }
}

impl IntoProposals for &Array2<f32> {
    fn into_proposals(self) -> Vec<RawProposal> {
        proposals_from_darknet(self.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_darknet_output_into_proposals() {
        let output = array![[0.5f32, 0.5, 0.1, 0.1, 0.9, 0.3, 0.7]];
        let proposals = (&output).into_proposals();
        assert_eq!(proposals.len(), 1);
        assert_eq!(proposals[0].scores, vec![0.3, 0.7]);
    }
}
