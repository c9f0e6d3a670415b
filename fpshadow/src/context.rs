use crate::FpShadowError;
use crate::config::ShadowConfig;
use crate::marks::MarkTable;
use crate::report::Report;
use crate::site::SiteTable;
use crate::storage::Storage;
use fpshadow_ops::Event;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, trace};

/// All shadow state for one analyzed program.
///
/// The host serializes guest threads, so nothing in here is shared or locked; events are fed
/// in one at a time through [`ShadowContext::handle`].
#[derive(Debug)]
pub struct ShadowContext {
    pub(crate) config: ShadowConfig,
    pub(crate) storage: Storage,
    pub(crate) sites: SiteTable,
    pub(crate) marks: MarkTable,
    running: bool,
}

impl ShadowContext {
    pub fn new(config: ShadowConfig) -> Result<Self, FpShadowError> {
        config.validate()?;
        Ok(Self {
            storage: Storage::new(config.temp_capacity),
            sites: SiteTable::default(),
            marks: MarkTable::default(),
            running: true,
            config,
        })
    }

    pub fn config(&self) -> &ShadowConfig {
        &self.config
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn sites(&self) -> &SiteTable {
        &self.sites
    }

    pub fn marks(&self) -> &MarkTable {
        &self.marks
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Resumes producing shadows
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stops producing new shadows. Everything already shadowed stays as it is.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn handle(&mut self, event: &Event) -> Result<(), FpShadowError> {
        match event {
            Event::Op(op) => self.execute(op),
            Event::Convert(conv) => self.convert(conv),
            Event::Move { src, dest, ty } => self.storage.copy(*src, *dest, *ty),
            Event::Unshadow { dest, ty } => self.storage.set(*dest, *ty, None),
            Event::EndBlock => {
                self.storage.end_block();
                Ok(())
            }
            Event::SwitchThread { tid } => {
                trace!(tid, "switching thread");
                self.storage.switch_thread(*tid);
                Ok(())
            }
            Event::ExitThread { tid } => {
                self.storage.exit_thread(*tid);
                Ok(())
            }
            Event::Mark(mark) => self.mark(mark),
            Event::Start => {
                self.start();
                Ok(())
            }
            Event::Stop => {
                self.stop();
                Ok(())
            }
        }
    }

    pub fn report(&self) -> Report {
        Report::build(&self.sites, &self.marks, &self.config)
    }

    pub fn write_report_to<W: Write>(&self, out: &mut W) -> Result<(), FpShadowError> {
        self.report().write_to(out)?;
        Ok(())
    }

    /// Writes the report to `path`, replacing anything already there
    pub fn write_report<P: AsRef<Path>>(&self, path: P) -> Result<(), FpShadowError> {
        let mut out = BufWriter::new(File::create(path.as_ref())?);
        self.write_report_to(&mut out)?;
        out.flush()?;
        info!(path = %path.as_ref().display(), "wrote report");
        Ok(())
    }
}
