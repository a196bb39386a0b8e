//! One-shot timers provided by the shell.
//!
//! There is no cancel operation: superseded timers are left to fire and the
//! core discards the callback by comparing the id it carries against the
//! latest one issued (last-writer-wins).

use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerOperation {
    Start { id: u64, millis: u64 },
}

impl Operation for TimerOperation {
    type Output = TimerOutput;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerOutput {
    Elapsed { id: u64 },
}

#[derive(Clone)]
pub struct Timer<Ev> {
    context: CapabilityContext<TimerOperation, Ev>,
}

impl<Ev> Capability<Ev> for Timer<Ev> {
    type Operation = TimerOperation;
    type MappedSelf<MappedEv> = Timer<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Timer::new(self.context.map_event(f))
    }
}

impl<Ev> Timer<Ev>
where
    Ev: 'static,
{
    pub fn new(context: CapabilityContext<TimerOperation, Ev>) -> Self {
        Self { context }
    }

    pub fn start<F>(&self, id: u64, millis: u64, make_event: F)
    where
        F: FnOnce(TimerOutput) -> Ev + Send + 'static,
    {
        let context = self.context.clone();
        self.context.spawn(async move {
            let output = context
                .request_from_shell(TimerOperation::Start { id, millis })
                .await;
            context.update_app(make_event(output));
        });
    }
}
