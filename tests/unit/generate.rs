use super::*;

use crate::render::{Quality, manim_output_path};

enum Behavior {
    WriteClip,
    Fail(&'static str),
    SucceedWithoutOutput,
}

struct FakeRenderer {
    behavior: Behavior,
    calls: Vec<RenderRequest>,
}

impl FakeRenderer {
    fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            calls: Vec::new(),
        }
    }
}

impl Renderer for FakeRenderer {
    fn render(&mut self, req: &RenderRequest) -> ManimalResult<()> {
        self.calls.push(req.clone());
        match self.behavior {
            Behavior::WriteClip => {
                let out = self.expected_output(req);
                fs::create_dir_all(out.parent().unwrap()).unwrap();
                fs::write(&out, req.entry.as_bytes()).unwrap();
                Ok(())
            }
            Behavior::Fail(stderr) => Err(ManimalError::render(format!(
                "manim exited with status 1: {stderr}"
            ))),
            Behavior::SucceedWithoutOutput => Ok(()),
        }
    }

    fn expected_output(&self, req: &RenderRequest) -> PathBuf {
        manim_output_path(&req.work_dir, req, Quality::Low)
    }
}

fn layout_with_scene(root: &Path, topic: &str, file: &str) -> OutputLayout {
    let layout = OutputLayout {
        scenes_dir: root.join("scenes"),
        output_dir: root.join("generated"),
    };
    let src = layout.source_path(topic, file);
    fs::create_dir_all(src.parent().unwrap()).unwrap();
    fs::write(&src, "class SceneX: pass\n").unwrap();
    layout
}

fn at<'a>(topic: &'a str, file: &'a str, entry: &'a str) -> EntryRef<'a> {
    EntryRef { topic, file, entry }
}

#[test]
fn renderer_runs_inside_output_dir() {
    let layout = OutputLayout {
        scenes_dir: PathBuf::from("scenes"),
        output_dir: PathBuf::from("/srv/assets/generated"),
    };
    assert_eq!(layout.render_root(), PathBuf::from("/srv/assets/generated"));
    assert_eq!(
        layout.clip_path("topicA", "SceneX"),
        PathBuf::from("/srv/assets/generated/topicA/SceneX.mp4")
    );
}

#[test]
fn successful_render_moves_clip_into_topic_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = layout_with_scene(tmp.path(), "topicA", "file1.py");
    let mut r = FakeRenderer::new(Behavior::WriteClip);

    let out = generate_entry(&layout, &mut r, at("topicA", "file1.py", "SceneX")).unwrap();

    assert_eq!(out, tmp.path().join("generated/topicA/SceneX.mp4"));
    assert_eq!(fs::read_to_string(&out).unwrap(), "SceneX");
    let produced = tmp
        .path()
        .join("generated/media/videos/topicA/file1/480p15/SceneX.mp4");
    assert!(!produced.exists());
    assert!(!tmp.path().join("media").exists());

    assert_eq!(r.calls.len(), 1);
    assert!(r.calls[0].source.is_absolute());
    assert_eq!(r.calls[0].work_dir, layout.output_dir);
}

#[test]
fn missing_source_fails_without_invoking_renderer() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = layout_with_scene(tmp.path(), "topicA", "file1.py");
    let mut r = FakeRenderer::new(Behavior::WriteClip);

    let err = generate_entry(&layout, &mut r, at("topicA", "missing.py", "SceneX")).unwrap_err();
    assert!(err.to_string().contains("scene file not found"));
    assert!(r.calls.is_empty());
}

#[test]
fn renderer_failure_carries_stderr() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = layout_with_scene(tmp.path(), "topicA", "file1.py");
    let mut r = FakeRenderer::new(Behavior::Fail("NameError: SceneX"));

    let err = generate_entry(&layout, &mut r, at("topicA", "file1.py", "SceneX")).unwrap_err();
    assert!(err.to_string().contains("NameError: SceneX"));
    assert!(!layout.clip_path("topicA", "SceneX").exists());
}

#[test]
fn zero_exit_without_clip_is_a_failure() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = layout_with_scene(tmp.path(), "topicA", "file1.py");
    let mut r = FakeRenderer::new(Behavior::SucceedWithoutOutput);

    let err = generate_entry(&layout, &mut r, at("topicA", "file1.py", "SceneX")).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
    assert_eq!(r.calls.len(), 1);
}

#[test]
fn setup_keeps_unrelated_files() {
    let tmp = tempfile::tempdir().unwrap();
    let layout = OutputLayout {
        scenes_dir: tmp.path().join("scenes"),
        output_dir: tmp.path().join("generated"),
    };
    let keep = layout.topic_dir("topicA").join("notes.txt");
    fs::create_dir_all(keep.parent().unwrap()).unwrap();
    fs::write(&keep, "keep").unwrap();

    layout.setup_output_dirs(["topicA", "topicB"]).unwrap();
    assert!(keep.exists());
    assert!(layout.topic_dir("topicB").is_dir());
}

#[test]
fn relocate_replaces_existing_target() {
    let tmp = tempfile::tempdir().unwrap();
    let from = tmp.path().join("a.mp4");
    let to = tmp.path().join("out/a.mp4");
    fs::create_dir_all(to.parent().unwrap()).unwrap();
    fs::write(&to, "old").unwrap();
    fs::write(&from, "new").unwrap();

    relocate(&from, &to).unwrap();
    assert_eq!(fs::read_to_string(&to).unwrap(), "new");
    assert!(!from.exists());
}

#[test]
fn relocate_failure_keeps_source_and_names_both_paths() {
    let tmp = tempfile::tempdir().unwrap();
    let from = tmp.path().join("a.mp4");
    fs::write(&from, "new").unwrap();
    // A non-empty directory at the target defeats both rename and copy.
    let to = tmp.path().join("out/a.mp4");
    fs::create_dir_all(&to).unwrap();
    fs::write(to.join("keep"), "k").unwrap();

    let err = relocate(&from, &to).unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("filesystem error:"), "{msg}");
    assert!(msg.contains("move '"), "{msg}");
    assert!(msg.contains("a.mp4"), "{msg}");
    assert_eq!(fs::read_to_string(&from).unwrap(), "new");
    assert!(to.join("keep").exists());
}

#[test]
fn failure_display_names_coordinates() {
    let f = EntryFailure {
        topic: "t".to_string(),
        file: "f.py".to_string(),
        entry: "S".to_string(),
        reason: "boom".to_string(),
    };
    assert_eq!(f.to_string(), "t/f.py S: boom");
}
