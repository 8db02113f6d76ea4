/// A callback invoked at each step of a long-running operation.
///
/// An optimizer build is the main client. It calls the observer before and
/// after every stage, when a toolchain stage is skipped in generate-only
/// mode, and when a toolchain stage fails. The events borrow from the build,
/// so an observer sees stage outputs and toolchain errors without copying
/// them. Returning `Some(action)` asks the build to react. A stop request
/// takes effect once the current stage has finished, so the target
/// directory is never left with a half-written file. Returning `None` lets
/// the build carry on.
///
/// Any `FnMut(&E) -> Option<A>` closure is an observer. `()` ignores every
/// event.
///
/// # Example
///
/// ```
/// use optigen_core::Observer;
///
/// enum Step {
///     Started(&'static str),
///     Finished(&'static str),
/// }
///
/// // Stops after the second finished step.
/// let mut finished = 0;
/// let mut observer = |step: &Step| match step {
///     Step::Started(_) => None,
///     Step::Finished(_) => {
///         finished += 1;
///         (finished == 2).then_some("stop")
///     }
/// };
///
/// assert_eq!(observer.observe(&Step::Started("prepare")), None);
/// assert_eq!(observer.observe(&Step::Finished("prepare")), None);
/// assert_eq!(observer.observe(&Step::Finished("render")), Some("stop"));
/// ```
pub trait Observer<E, A> {
    /// Handles one event, optionally requesting an action.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive<O: Observer<u32, &'static str>>(mut observer: O, events: &[u32]) -> Vec<&'static str> {
        events.iter().filter_map(|e| observer.observe(e)).collect()
    }

    #[test]
    fn unit_observer_never_acts() {
        assert!(drive((), &[1, 2, 3]).is_empty());
    }

    #[test]
    fn closures_are_observers() {
        let mut seen = 0;
        let actions = drive(
            |e: &u32| {
                seen += 1;
                (*e == 2).then_some("stop")
            },
            &[1, 2, 3],
        );
        assert_eq!(actions, vec!["stop"]);
        assert_eq!(seen, 3);
    }
}
