use crate::model::PixelType;

/// Blocking yes/no questions asked during a copy.
pub trait CopyPrompt {
    /// The new label does not fit in `from`; convert the target to `to`?
    fn confirm_promotion(&self, label: f64, from: PixelType, to: PixelType) -> bool;

    /// A series copy touches a chunked stack and will be slow; go on?
    fn confirm_slow_copy(&self) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl CopyPrompt for AutoConfirm {
    fn confirm_promotion(&self, _label: f64, _from: PixelType, _to: PixelType) -> bool {
        true
    }

    fn confirm_slow_copy(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDecline;

impl CopyPrompt for AutoDecline {
    fn confirm_promotion(&self, _label: f64, _from: PixelType, _to: PixelType) -> bool {
        false
    }

    fn confirm_slow_copy(&self) -> bool {
        false
    }
}
