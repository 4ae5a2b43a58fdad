pub mod serial_queue;
