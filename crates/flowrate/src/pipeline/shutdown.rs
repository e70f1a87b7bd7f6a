use crate::{control::ControlInput, coordinator::Coordinator};

/// Starts an orderly teardown of a running pipeline.
///
/// Firing closes the control input and then cancels the [`Coordinator`].
/// The generator does not depend on the closed input to stop; it is closed
/// so that control publishers learn no one is listening any more.
#[derive(Clone, Debug)]
pub struct ShutdownTrigger {
    control: ControlInput,
    coordinator: Coordinator,
}

impl ShutdownTrigger {
    pub fn new(control: ControlInput, coordinator: Coordinator) -> Self {
        Self {
            control,
            coordinator,
        }
    }

    /// Closes the control input and cancels the pipeline.
    ///
    /// Only the first call has an effect. Returns `true` for that call.
    pub fn fire(&self) -> bool {
        let first = self.control.close();
        let already_cancelled = self.coordinator.is_cancelled();
        self.coordinator.cancel();

        if first && !already_cancelled {
            tracing::info!("shutdown triggered");
        }
        first
    }

    pub fn is_fired(&self) -> bool {
        self.coordinator.is_cancelled()
    }
}
