use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use env_logger::{Builder, Target};
use ember_core::config::SystemConfig;

use crate::config_gen;

pub fn init(config_path: &Path, verbose: bool) {
    if let Err(e) = config_gen::ensure_config_exists(config_path) {
        eprintln!("Config bootstrap warning: {:#}", e);
    }

    if let Err(e) = ember_shared::config::init(config_path) {
        eprintln!("Config load warning: {}", e);
    }

    init_logger(verbose);
}

struct TeeWriter<W1, W2>(W1, W2);

impl<W1: Write, W2: Write> Write for TeeWriter<W1, W2> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let n = self.0.write(buf)?;
        self.1.write_all(&buf[..n])?;
        Ok(n)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        self.0.flush()?;
        self.1.flush()?;
        Ok(())
    }
}

fn init_logger(verbose: bool) {
    let sys_cfg: SystemConfig = ember_shared::config::get("system");
    let level = if verbose { "debug" } else { sys_cfg.log_level.as_str() };
    let mut builder = Builder::from_env(env_logger::Env::default().default_filter_or(level));

    if let Err(e) = fs::create_dir_all(&sys_cfg.log_path) {
        eprintln!("Failed to create log dir: {}", e);
    }
    let log_file_path = Path::new(&sys_cfg.log_path).join("ember.log");
    match OpenOptions::new().create(true).append(true).open(&log_file_path) {
        Ok(log_file) => {
            builder.target(Target::Pipe(Box::new(TeeWriter(std::io::stderr(), log_file))));
        }
        Err(e) => eprintln!("Failed to open log file {:?}: {}", log_file_path, e),
    }

    builder.init();
}
