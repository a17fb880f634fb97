mod echo;
mod handler;

pub use echo::EchoConnectionHandler;
pub use handler::ws_handler;
