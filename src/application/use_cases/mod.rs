pub mod notification;
pub mod subscription_sync;
