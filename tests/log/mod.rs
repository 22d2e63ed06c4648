mod log_formats;
