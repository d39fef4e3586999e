mod change_serializer;
mod commit_message;
mod commit_reader;
mod commit_writer;
mod snapshot;

pub use change_serializer::ChangeSerializer;
pub use commit_message::CommitMessage;
pub use commit_reader::CommitReader;
pub use commit_writer::CommitWriter;
pub use snapshot::{SnapshotReader, SnapshotWriter};
