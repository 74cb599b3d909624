pub mod puma_dev;
