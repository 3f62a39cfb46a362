//! Command/session core for the CCView panel.
//!
//! The panel UI, the external cclib interpreter, and the 3D viewer are all
//! external collaborators; this crate is the glue between them. It parses
//! user-typed command lines into a small typed grammar, dispatches them to a
//! local viewer context or to the interpreter over a request/response
//! protocol, routes and formats the heterogeneous output, and maintains the
//! command history plus the bidirectional message contract with the UI
//! surface (see `ccview-protocol`).

pub mod bridge;
pub mod command;
pub mod dispatch;
pub mod env;
pub mod envelope;
pub mod error;
pub mod history;
pub mod router;
pub mod session;

pub use bridge::BridgeTimeouts;
pub use bridge::CclibBridge;
pub use bridge::InterpreterInvoker;
pub use bridge::InvocationResult;
pub use command::Command;
pub use command::CommandKind;
pub use command::parse;
pub use dispatch::Dispatcher;
pub use dispatch::SessionContext;
pub use env::EnvironmentState;
pub use error::BridgeError;
pub use error::CommandFailure;
pub use history::HistoryNavigator;
pub use router::OutputRouter;
pub use router::PanelSinks;
pub use router::PresentationChannel;
pub use router::RoutedOutput;
pub use session::Session;
