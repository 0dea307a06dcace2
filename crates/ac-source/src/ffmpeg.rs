// Capture caméra via subprocess `ffmpeg` (même approche que la lecture vidéo :
// pas de bindings natifs, juste un pipe rawvideo sur stdout).
//
//   - `input_spec`        : format d'entrée + nom du périphérique selon l'OS
//   - `ffmpeg_args`       : ligne de commande complète pour des hints donnés
//   - `read_exact_or_eof` : lecture d'une frame complète depuis le pipe
//   - `FfmpegCamera`      : implémentation de `CaptureDevice`
//
// ffmpeg peut démarrer puis mourir aussitôt (périphérique occupé, nœud
// /dev/video sans capture, résolution refusée). Chaque lancement lit donc
// une première frame avant d'être considéré comme acquis ; sinon la fin de
// stderr devient la raison de `SourceError::DeviceUnavailable`.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::io::{BufRead, BufReader, Read};
use std::process::{Child, ChildStderr, ChildStdout, Command, Stdio};
use std::thread;

use ac_core::config::CaptureHints;
use ac_core::frame::{Frame, PixelLayout};
use ac_core::traits::CaptureDevice;

use crate::error::SourceError;

/// Bytes per pixel of the `rgb24` pipe.
const BYTES_PER_PIXEL: usize = 3;

/// Lignes de stderr conservées pour le diagnostic.
const STDERR_TAIL_LINES: usize = 8;

/// Entrée ffmpeg : démuxeur de capture + identifiant du périphérique.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InputSpec {
    /// Valeur de `-f` (ex. `v4l2`, `avfoundation`).
    pub format: &'static str,
    /// Valeur de `-i` (ex. `/dev/video0`, `0:none`).
    pub device: String,
}

/// Résout l'entrée ffmpeg pour l'index `index` sur la plateforme courante.
///
/// # Errors
/// Returns [`SourceError::DeviceUnavailable`] if the platform has no
/// index-addressable capture input, or (Linux) if `/dev/video{index}`
/// does not exist.
#[cfg(target_os = "linux")]
pub fn input_spec(index: u32) -> Result<InputSpec, SourceError> {
    let device = format!("/dev/video{index}");
    if !std::path::Path::new(&device).exists() {
        return Err(SourceError::DeviceUnavailable {
            index,
            reason: format!("{device} n'existe pas"),
        });
    }
    Ok(InputSpec {
        format: "v4l2",
        device,
    })
}

#[cfg(target_os = "macos")]
pub fn input_spec(index: u32) -> Result<InputSpec, SourceError> {
    Ok(InputSpec {
        format: "avfoundation",
        device: format!("{index}:none"),
    })
}

#[cfg(not(any(target_os = "linux", target_os = "macos")))]
pub fn input_spec(index: u32) -> Result<InputSpec, SourceError> {
    Err(SourceError::DeviceUnavailable {
        index,
        reason: "capture ffmpeg non supportée sur cette plateforme (essayez --features webcam)".into(),
    })
}

/// Arguments ffmpeg : capture → scale aux hints → rawvideo rgb24 sur stdout.
///
/// Avec `request_format`, `-framerate` et `-video_size` sont transmis au
/// pilote. Sans, le périphérique garde son mode natif. Dans les deux cas le
/// filtre `scale` garantit la taille de sortie.
///
/// # Example
/// ```
/// use ac_core::config::CaptureHints;
/// use ac_source::ffmpeg::{InputSpec, ffmpeg_args};
/// let input = InputSpec { format: "v4l2", device: "/dev/video0".into() };
/// let args = ffmpeg_args(&input, &CaptureHints::default(), true);
/// assert!(args.windows(2).any(|w| w == ["-video_size", "640x480"]));
/// assert_eq!(args.last().map(String::as_str), Some("pipe:1"));
///
/// let native = ffmpeg_args(&input, &CaptureHints::default(), false);
/// assert!(!native.iter().any(|a| a == "-video_size"));
/// assert!(native.iter().any(|a| a == "scale=640:480:flags=area"));
/// ```
#[must_use]
pub fn ffmpeg_args(input: &InputSpec, hints: &CaptureHints, request_format: bool) -> Vec<String> {
    let fps = hints.fps.to_string();
    let size = format!("{}x{}", hints.width, hints.height);
    let scale = format!("scale={}:{}:flags=area", hints.width, hints.height);

    let mut args: Vec<&str> = vec!["-hide_banner", "-loglevel", "error", "-f", input.format];
    if request_format {
        args.extend(["-framerate", fps.as_str(), "-video_size", size.as_str()]);
    }
    args.extend([
        "-i",
        input.device.as_str(),
        "-vf",
        scale.as_str(),
        "-f",
        "rawvideo",
        "-pix_fmt",
        "rgb24",
        "-an",
        "pipe:1",
    ]);
    args.into_iter().map(ToString::to_string).collect()
}

/// Lit exactement `buf.len()` bytes depuis `reader`.
///
/// # Errors
/// Retourne `Ok(true)` si lu avec succès, `Ok(false)` sur EOF avant complétion,
/// `Err` sur erreur I/O fatale.
pub fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<bool> {
    let mut total = 0usize;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => return Ok(false),
            Ok(n) => total += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(true)
}

fn frame_len(hints: &CaptureHints) -> usize {
    hints.width as usize * hints.height as usize * BYTES_PER_PIXEL
}

/// Vide stderr en continu (le pipe ne doit jamais bloquer ffmpeg) et
/// renvoie les dernières lignes à la fin du processus.
fn drain_stderr(stderr: ChildStderr) -> Option<thread::JoinHandle<String>> {
    thread::Builder::new()
        .name("ffmpeg-stderr".into())
        .spawn(move || {
            let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
            for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                log::debug!("ffmpeg : {line}");
                if tail.len() == STDERR_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
            tail.into_iter().collect::<Vec<_>>().join(" | ")
        })
        .ok()
}

/// Processus ffmpeg vivant et ses pipes.
struct Pipeline {
    child: Child,
    stdout: ChildStdout,
    stderr: Option<thread::JoinHandle<String>>,
}

impl Pipeline {
    /// Tue et récupère le processus. Retourne la fin de son stderr.
    fn stop(mut self) -> String {
        let _ = self.child.kill();
        let _ = self.child.wait();
        self.stderr.take().and_then(|h| h.join().ok()).unwrap_or_default()
    }
}

/// Ce qu'il faut pour (re)lancer ffmpeg sur un périphérique.
struct Launcher {
    program: OsString,
    index: u32,
    input: InputSpec,
}

impl Launcher {
    fn spawn(&self, hints: &CaptureHints, request_format: bool) -> Result<(Pipeline, Frame), SourceError> {
        let mut command = Command::new(&self.program);
        command
            .args(ffmpeg_args(&self.input, hints, request_format))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Groupe de processus séparé : Ctrl+C n'atteint que la boucle, qui
        // arrête ffmpeg elle-même à la libération.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SourceError::FfmpegNotFound
            } else {
                SourceError::Io(e)
            }
        })?;
        log::debug!(
            "ffmpeg spawné : {} {} @ {}x{} {}fps (format demandé : {request_format})",
            self.input.format,
            self.input.device,
            hints.width,
            hints.height,
            hints.fps
        );

        let stderr = child.stderr.take().and_then(drain_stderr);
        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(SourceError::DeviceUnavailable {
                index: self.index,
                reason: "stdout ffmpeg indisponible".into(),
            });
        };
        let mut pipeline = Pipeline { child, stdout, stderr };

        // Amorçage : le périphérique n'est acquis qu'une fois une frame reçue.
        let mut first = vec![0u8; frame_len(hints)];
        match read_exact_or_eof(&mut pipeline.stdout, &mut first) {
            Ok(true) => match Frame::new(first, hints.width, hints.height, PixelLayout::Rgb) {
                Ok(frame) => Ok((pipeline, frame)),
                Err(e) => {
                    pipeline.stop();
                    Err(SourceError::Transform(e.to_string()))
                }
            },
            Ok(false) | Err(_) => {
                let tail = pipeline.stop();
                let reason = if tail.is_empty() {
                    "ffmpeg s'est arrêté sans produire de frame".to_string()
                } else {
                    tail
                };
                Err(SourceError::DeviceUnavailable {
                    index: self.index,
                    reason,
                })
            }
        }
    }

    /// Lance avec les hints ; si le périphérique les refuse, relance en
    /// mode natif (seul le `scale` impose alors la taille).
    fn start(&self, hints: &CaptureHints) -> Result<(Pipeline, Frame), SourceError> {
        match self.spawn(hints, true) {
            Err(SourceError::DeviceUnavailable { reason, .. }) => {
                log::warn!(
                    "Caméra {} : {}x{}@{} refusé ({reason}), essai en mode natif",
                    self.index,
                    hints.width,
                    hints.height,
                    hints.fps
                );
                self.spawn(hints, false)
            }
            other => other,
        }
    }
}

/// Caméra pilotée par un processus `ffmpeg`.
///
/// `open` ne réussit qu'une fois une première frame reçue ; elle est
/// restituée par le premier [`CaptureDevice::read_frame`].
///
/// # Example
/// ```no_run
/// use ac_core::config::CaptureHints;
/// use ac_core::traits::CaptureDevice;
/// use ac_source::ffmpeg::FfmpegCamera;
/// let mut cam = FfmpegCamera::open_with(0, &CaptureHints::default()).unwrap();
/// let frame = cam.read_frame();
/// cam.release();
/// ```
pub struct FfmpegCamera {
    launcher: Launcher,
    hints: CaptureHints,
    pipeline: Option<Pipeline>,
    /// Frame d'amorçage, pas encore rendue.
    pending: Option<Frame>,
    /// Buffer de lecture, `w × h × 3` octets.
    frame_buf: Vec<u8>,
}

impl FfmpegCamera {
    /// Acquiert le périphérique `index` avec les hints par défaut.
    ///
    /// # Errors
    /// See [`FfmpegCamera::open_with`].
    pub fn open(index: u32) -> Result<Self, SourceError> {
        Self::open_with(index, &CaptureHints::default())
    }

    /// Acquiert le périphérique `index` directement aux `hints` voulus.
    ///
    /// # Errors
    /// Returns [`SourceError::DeviceUnavailable`] if the device cannot be
    /// addressed or ffmpeg exits before delivering a frame,
    /// [`SourceError::FfmpegNotFound`] if `ffmpeg` is missing.
    pub fn open_with(index: u32, hints: &CaptureHints) -> Result<Self, SourceError> {
        Self::launch(OsString::from("ffmpeg"), index, input_spec(index)?, hints)
    }

    fn launch(program: OsString, index: u32, input: InputSpec, hints: &CaptureHints) -> Result<Self, SourceError> {
        let launcher = Launcher { program, index, input };
        let (pipeline, first) = launcher.start(hints)?;
        log::info!("Caméra {index} ouverte via ffmpeg ({})", launcher.input.device);
        Ok(Self {
            launcher,
            hints: *hints,
            pipeline: Some(pipeline),
            pending: Some(first),
            frame_buf: vec![0u8; frame_len(hints)],
        })
    }

    fn install(&mut self, hints: &CaptureHints, pipeline: Pipeline, first: Frame) {
        self.hints = *hints;
        self.frame_buf = vec![0u8; frame_len(hints)];
        self.pipeline = Some(pipeline);
        self.pending = Some(first);
    }
}

impl CaptureDevice for FfmpegCamera {
    fn configure(&mut self, hints: &CaptureHints) {
        if *hints == self.hints && self.pipeline.is_some() {
            return;
        }
        if let Some(p) = self.pipeline.take() {
            p.stop();
        }
        self.pending = None;

        match self.launcher.start(hints) {
            Ok((pipeline, first)) => self.install(hints, pipeline, first),
            Err(e) => {
                // Hints refusés même en mode natif : on revient aux précédents.
                log::warn!("Hints {}x{}@{} ignorés : {e}", hints.width, hints.height, hints.fps);
                let previous = self.hints;
                match self.launcher.start(&previous) {
                    Ok((pipeline, first)) => self.install(&previous, pipeline, first),
                    Err(e) => log::warn!("Relance ffmpeg impossible : {e}"),
                }
            }
        }
    }

    fn read_frame(&mut self) -> Option<Frame> {
        if let Some(frame) = self.pending.take() {
            return Some(frame);
        }
        let pipeline = self.pipeline.as_mut()?;
        match read_exact_or_eof(&mut pipeline.stdout, &mut self.frame_buf) {
            Ok(true) => Frame::new(
                self.frame_buf.clone(),
                self.hints.width,
                self.hints.height,
                PixelLayout::Rgb,
            )
            .ok(),
            Ok(false) => {
                let tail = self.pipeline.take().map(Pipeline::stop).unwrap_or_default();
                log::warn!("Caméra {} : fin de flux ffmpeg {tail}", self.launcher.index);
                None
            }
            Err(e) => {
                log::warn!("Caméra {} : erreur lecture pipe : {e}", self.launcher.index);
                None
            }
        }
    }

    fn release(&mut self) {
        self.pending = None;
        if let Some(p) = self.pipeline.take() {
            p.stop();
            log::info!("Caméra {} libérée", self.launcher.index);
        }
    }
}

impl Drop for FfmpegCamera {
    fn drop(&mut self) {
        self.release();
    }
}
