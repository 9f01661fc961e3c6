use super::types::{ConverterStatus, Job};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

/// Runs a job on a background thread, reporting through `sender`.
///
/// Failures arrive as [`ConverterStatus::Error`]; the returned handle only
/// tells the caller when the thread is done.
pub fn run_async(job: Job, sender: Sender<ConverterStatus>) -> JoinHandle<()> {
    thread::spawn(move || {
        let tx_callback = sender.clone();

        let result = job.run(move |status| {
            let _ = tx_callback.send(status);
        });

        if let Err(e) = result {
            let _ = sender.send(ConverterStatus::Error(format!("{e:#}")));
        }
    })
}
