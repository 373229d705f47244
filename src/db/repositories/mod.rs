mod dose_log;
mod medications;
mod snoozes;
