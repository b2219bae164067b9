// 分散バックエンドの作業分配
// カタログ分割、ファイル名リストのワイヤ形式、通信層、分配プロトコル

pub mod batch;
pub mod communicator;
pub mod error;
pub mod frame;
pub mod local;
pub mod partition;
pub mod process;
pub mod protocol;

pub use batch::{BatchError, FilenameBatch};
pub use communicator::{Communicator, ROOT_RANK};
pub use error::DistributionError;
pub use frame::{Frame, FrameError};
pub use local::LocalCommunicator;
pub use partition::{partition_ranges, share_size, WorkPartition};
pub use process::ProcessCommunicator;
pub use protocol::{distribute_catalog, receive_share, scatter_catalog};
