pub mod messages;
pub mod receiver;
pub mod sender;
pub mod seqno;

pub use messages::{TcpFlags, TcpReceiverMessage, TcpSenderMessage};
pub use receiver::TcpReceiver;
pub use sender::TcpSender;
pub use seqno::Wrap32;
