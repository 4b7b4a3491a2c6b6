/// Process adapters for running external programs
mod tokio_command_executor;

pub use tokio_command_executor::TokioCommandExecutor;
