use crate::{errors::FlowError, model::StepOutputs};

/// Resultado abstracto de ejecutar un intento de step.
#[derive(Debug)]
pub enum StepRunResult {
    Success { outputs: StepOutputs },
    Failure { error: FlowError },
}

impl From<Result<StepOutputs, FlowError>> for StepRunResult {
    fn from(r: Result<StepOutputs, FlowError>) -> Self {
        match r {
            Ok(outputs) => StepRunResult::Success { outputs },
            Err(error) => StepRunResult::Failure { error },
        }
    }
}
