pub mod fake_merger;
