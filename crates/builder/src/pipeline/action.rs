/// Actions an observer can take during a build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Finish the current stage, then end the build.
    ///
    /// The build returns successfully with
    /// [`BuildStatus::StoppedByObserver`](super::BuildStatus::StoppedByObserver);
    /// files written so far stay in place.
    Stop,
}
