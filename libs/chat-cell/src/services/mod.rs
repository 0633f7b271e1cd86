pub mod chat;
pub mod history;
pub mod interpreter;

pub use chat::ChatService;
pub use history::ChatHistory;
pub use interpreter::InterpreterClient;
