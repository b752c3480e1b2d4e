//! WebSocket fan-out for post comment rooms and private chat rooms.
//!
//! # Architecture
//!
//! - **One hub per room kind**: [`Hub<CommentRoom>`](room::CommentRoom) keys
//!   rooms by post id, [`Hub<PrivateRoom>`](room::PrivateRoom) by chat id. Both
//!   share the receive loop in [`hub`]; only the key, the frame shape and the
//!   persistence call differ.
//! - **Owned registry**: each hub owns its own
//!   [`ConnectionRegistry`](connection::ConnectionRegistry). Comment rooms and
//!   private rooms never share membership state.
//! - **Snapshot broadcast**: delivery iterates over a copy of the room taken
//!   under the registry's shard lock, so a slow client never blocks joins or
//!   leaves elsewhere.
//! - **Persist, then relay**: a frame is written to its store before it is
//!   sent to anyone, including the sender's own echo.
//! - **Ephemeral**: a client that is not connected misses live frames and
//!   reads history through the regular API instead.
//!
//! # Connection lifecycle
//!
//! `Connecting → Registered → (Relaying)* → Closed`
//!
//! 1. The web layer upgrades the HTTP request and spawns a socket writer.
//! 2. [`Hub::serve`](hub::Hub::serve) joins the room (Registered).
//! 3. Every frame is validated, persisted and broadcast (Relaying).
//! 4. Read error, close frame, end of stream, or hub shutdown leaves the room
//!    (Closed). Other members are not told.
//!
//! # Modules
//!
//! - `connection`: room-keyed registry with a type-safe ConnectionId
//! - `hub`: the per-connection receive loop and broadcast
//! - `room`: comment and private room kinds
//! - `message`: wire frames
//! - `store`: persistence contracts implemented by the domain layer

pub mod connection;
pub mod error;
pub mod hub;
pub mod message;
pub mod room;
pub mod store;

pub use hub::Hub;
pub use room::{CommentRoom, PrivateRoom};
