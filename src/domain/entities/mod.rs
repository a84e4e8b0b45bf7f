pub mod payment_record;
pub mod subscription_event;
