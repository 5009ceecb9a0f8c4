use std::{
    io::{self, BufRead, BufReader, Read, Write},
    process::{Command, Stdio},
    thread,
};

use tracing::{debug, error};

use crate::{parse_progress, progress_marker, Error};

/// How the output of a command reaches the console.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Capture combined output and print it only when the command fails.
    #[default]
    Silent,
    /// Stream combined output as it arrives and surface percentages.
    Live,
}

/// Runs external commands to completion.
///
/// stdout and stderr are merged in arrival order. Lines end at `\n` or `\r`
/// so that progress bars redrawn in place are seen as separate lines.
/// There is no timeout: a hanging tool hangs the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandRunner {
    mode: OutputMode,
}

impl CommandRunner {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    pub fn silent() -> Self {
        Self::new(OutputMode::Silent)
    }

    pub fn live() -> Self {
        Self::new(OutputMode::Live)
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Runs `cmd`, writing console output to stdout.
    ///
    /// Returns the decoded combined output in silent mode and an empty
    /// string in live mode.
    pub fn run(&self, cmd: &mut Command) -> Result<String, Error> {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_with_writer(cmd, &mut out)
    }

    /// Same as [`CommandRunner::run`], but writes console output to `out`.
    pub fn run_with_writer<W: Write>(
        &self,
        cmd: &mut Command,
        out: &mut W,
    ) -> Result<String, Error> {
        let command = command_line(cmd);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        debug!(?command, mode = ?self.mode, "Running command");

        let mut child = cmd
            .spawn()
            .map_err(|e| Error::CommandExecutionFailure(command.clone(), e))?;

        let (sender, receiver) = flume::unbounded();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_line_reader(stdout, sender.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_line_reader(stderr, sender.clone()));
        }
        drop(sender);

        let mut captured = Vec::new();
        let mut forward_result = Ok(());
        // Ends once both readers have hung up.
        for line in receiver.iter() {
            match self.mode {
                OutputMode::Silent => captured.extend_from_slice(&line),
                OutputMode::Live => {
                    if forward_result.is_ok() {
                        forward_result = forward_live_line(out, &line);
                    }
                }
            }
        }

        let status = child
            .wait()
            .map_err(|e| Error::CommandExecutionFailure(command.clone(), e))?;
        for reader in readers {
            match reader.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(?command, "Failed to read command output: {e}"),
                Err(_) => error!(?command, "Output reader thread panicked"),
            }
        }
        forward_result.map_err(|e| Error::Output(command.clone(), e))?;

        if !status.success() {
            if self.mode == OutputMode::Silent {
                out.write_all(&captured)
                    .and_then(|()| out.flush())
                    .map_err(|e| Error::Output(command.clone(), e))?;
            }
            return Err(Error::CommandFailure {
                command,
                code: status.code(),
            });
        }

        debug!(?command, "Command finished");
        match self.mode {
            OutputMode::Silent => Ok(String::from_utf8_lossy(&captured).into_owned()),
            OutputMode::Live => Ok(String::new()),
        }
    }
}

fn forward_live_line<W: Write>(out: &mut W, line: &[u8]) -> io::Result<()> {
    out.write_all(line)?;
    let text = String::from_utf8_lossy(line);
    if let Some(percent) = parse_progress(&text) {
        if !line.ends_with(b"\n") {
            out.write_all(b"\n")?;
        }
        writeln!(out, "{}", progress_marker(percent))?;
    }
    out.flush()
}

/// Program and arguments of `cmd`, for messages.
pub fn command_line(cmd: &Command) -> Vec<String> {
    std::iter::once(cmd.get_program())
        .chain(cmd.get_args())
        .map(|s| s.to_string_lossy().into_owned())
        .collect()
}

fn spawn_line_reader<R>(
    reader: R,
    sender: flume::Sender<Vec<u8>>,
) -> thread::JoinHandle<io::Result<()>>
where
    R: Read + Send + 'static,
{
    thread::spawn(move || {
        let mut reader = BufReader::new(reader);
        loop {
            let mut line = Vec::new();
            if !read_output_line(&mut reader, &mut line)? || sender.send(line).is_err() {
                return Ok(());
            }
        }
    })
}

/// Reads one line ending at `\n`, `\r` or `\r\n` into `line`, keeping the
/// line end. Returns `false` at end of input when nothing was read.
///
/// After a `\r` this waits for the next byte to tell a lone `\r` from
/// `\r\n`.
fn read_output_line<R: BufRead>(reader: &mut R, line: &mut Vec<u8>) -> io::Result<bool> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(!line.is_empty());
        }
        match buf.iter().position(|&b| b == b'\n' || b == b'\r') {
            Some(i) => {
                line.extend_from_slice(&buf[..=i]);
                reader.consume(i + 1);
                if line.ends_with(b"\r") && reader.fill_buf()?.first() == Some(&b'\n') {
                    line.push(b'\n');
                    reader.consume(1);
                }
                return Ok(true);
            }
            None => {
                let len = buf.len();
                line.extend_from_slice(buf);
                reader.consume(len);
            }
        }
    }
}
