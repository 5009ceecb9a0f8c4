#![cfg(unix)]

use std::{
    fs,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
};

use avatar_core::{AvatarRenderer, Error, RenderJob, RenderOptions};
use avatar_sadtalker::SadTalker;

/// A SadTalker checkout whose "python" records its arguments and writes a
/// timestamp-named video into the result directory.
fn fake_checkout(exit_code: i32) -> (tempfile::TempDir, PathBuf) {
    let root = tempfile::tempdir().unwrap();
    fs::write(root.path().join("inference.py"), "# fake\n").unwrap();
    let python = root.path().join("python");
    fs::write(
        &python,
        format!(
            r#"#!/bin/sh
pwd > "{root}/cwd"
echo "$@" > "{root}/args"
echo "$KMP_DUPLICATE_LIB_OK" > "{root}/env"
while [ $# -gt 0 ]; do
  if [ "$1" = "--result_dir" ]; then result_dir="$2"; fi
  shift
done
echo "Face Renderer:  50%"
touch "$result_dir/2024_05_01_10.00.00.mp4"
exit {exit_code}
"#,
            root = root.path().display()
        ),
    )
    .unwrap();
    fs::set_permissions(&python, fs::Permissions::from_mode(0o755)).unwrap();
    (root, python)
}

fn write_inputs(dir: &Path) -> (PathBuf, PathBuf, PathBuf) {
    let image = dir.join("face.png");
    let audio = dir.join("speech.wav");
    let out = dir.join("out");
    fs::write(&image, b"png").unwrap();
    fs::write(&audio, b"wav").unwrap();
    fs::create_dir(&out).unwrap();
    fs::write(out.join("previous.mp4"), b"old").unwrap();
    (image, audio, out)
}

#[test]
fn test_render_reports_new_videos() {
    let (root, python) = fake_checkout(0);
    let work = tempfile::tempdir().unwrap();
    let (image, audio, out) = write_inputs(work.path());

    let sadtalker =
        SadTalker::resolve(Some(&python), root.path(), Path::new("checkpoints"), &[]).unwrap();
    let options = RenderOptions::default();
    let videos = sadtalker
        .render(&RenderJob {
            source_image: &image,
            driven_audio: &audio,
            result_dir: &out,
            options: &options,
        })
        .unwrap();

    // absolute, not canonicalized
    assert_eq!(videos, vec![out.join("2024_05_01_10.00.00.mp4")]);

    let cwd = fs::read_to_string(root.path().join("cwd")).unwrap();
    assert_eq!(
        Path::new(cwd.trim()),
        fs::canonicalize(root.path()).unwrap()
    );
    assert_eq!(
        fs::read_to_string(root.path().join("env")).unwrap().trim(),
        "TRUE"
    );
    let args = fs::read_to_string(root.path().join("args")).unwrap();
    assert!(args.starts_with("inference.py --driven_audio /"), "{args}");
    assert!(
        args.contains("--preprocess crop --batch_size 1 --size 256 --pose_style 0"),
        "{args}"
    );
}

#[test]
fn test_render_failure_keeps_exit_code() {
    let (root, python) = fake_checkout(9);
    let work = tempfile::tempdir().unwrap();
    let (image, audio, out) = write_inputs(work.path());

    let sadtalker = SadTalker::new(python, root.path(), "checkpoints");
    let options = RenderOptions::default();
    let err = sadtalker
        .render(&RenderJob {
            source_image: &image,
            driven_audio: &audio,
            result_dir: &out,
            options: &options,
        })
        .unwrap_err();
    assert_eq!(err.exit_code(), Some(9));
}

#[test]
fn test_render_missing_audio() {
    let (root, python) = fake_checkout(0);
    let work = tempfile::tempdir().unwrap();
    let (image, _, out) = write_inputs(work.path());

    let sadtalker = SadTalker::new(python, root.path(), "checkpoints");
    let options = RenderOptions::default();
    let result = sadtalker.render(&RenderJob {
        source_image: &image,
        driven_audio: &work.path().join("missing.wav"),
        result_dir: &out,
        options: &options,
    });
    assert!(
        matches!(result, Err(Error::NoFile(ref p)) if p.ends_with("missing.wav")),
        "{result:?}"
    );
    assert!(!root.path().join("args").exists());
}
