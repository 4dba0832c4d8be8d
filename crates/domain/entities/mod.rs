pub mod subscription_periods;
