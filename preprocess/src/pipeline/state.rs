use state_machines::state_machine;

state_machine! {
    name: PreprocessMachine,
    state: PreprocessState,
    initial: Ready,
    states: [Ready, Loaded, Submitted, Drained, Completed],
    events {
        load_records { transition: { from: Ready, to: Loaded } }
        submit_tasks { transition: { from: Loaded, to: Submitted } }
        drain_results { transition: { from: Submitted, to: Drained } }
        finalize { transition: { from: Drained, to: Completed } }
    }
}

pub fn ready() -> PreprocessMachine<(), Ready> {
    PreprocessMachine::new(())
}
