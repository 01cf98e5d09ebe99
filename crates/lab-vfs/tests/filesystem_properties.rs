//! Filesystem Integration Tests
//!
//! End-to-end checks of the public engine surface: path folding, the
//! permission codec, tree mutation, queries and lesson resets.

use lab_vfs::{
    resolve, ErrorKind, Filesystem, FindOptions, FindType, LabConfig, ListOptions, ManualClock,
    Permissions,
};

const START: i64 = 1_709_543_700_000;

fn seeded() -> (Filesystem, ManualClock) {
    let clock = ManualClock::new(START);
    let fs = Filesystem::with_config(LabConfig::default(), clock.clone()).unwrap();
    (fs, clock)
}

fn empty() -> Filesystem {
    Filesystem::empty(LabConfig::default(), ManualClock::new(START))
}

/// Every path in the tree with the fields that must survive a reset.
fn shape(fs: &Filesystem) -> Vec<(String, u64, u32, u32, u32)> {
    fs.find("/", &FindOptions::default())
        .unwrap()
        .into_iter()
        .map(|p| {
            let st = fs.stat(&p).unwrap();
            (p, st.size, st.mode, st.uid, st.gid)
        })
        .collect()
}

#[test]
fn test_mode_roundtrip() {
    for mode in 0..=0o777u32 {
        assert_eq!(Permissions::decode(mode).encode(), mode, "mode {:o}", mode);
    }
}

#[test]
fn test_permission_rendering() {
    assert_eq!(Permissions::decode(0o755).render(true), "drwxr-xr-x");
    assert_eq!(Permissions::decode(0o600).render(false), "-rw-------");
}

#[test]
fn test_resolve_is_idempotent() {
    let inputs = [
        "", ".", "..", "/", "~", "~/notes.txt", "a/b/../c", "/../../x", "./x/./y/", "//etc//nginx/",
        "../../..", "~/../..", "x/../../y",
    ];
    for input in inputs {
        let once = resolve(input, "/home/student/projects", "/home/student");
        let twice = resolve(&once, "/home/student/projects", "/home/student");
        assert_eq!(once, twice, "input {:?}", input);
        assert!(once.starts_with('/'));
    }
}

#[test]
fn test_resolve_dotdot_never_escapes_root() {
    assert_eq!(resolve("..", "/a/b", "/"), "/a");
    assert_eq!(resolve("../../..", "/a", "/"), "/");
}

#[test]
fn test_mkdir_p_creates_every_level() {
    let mut fs = empty();
    fs.mkdir_p("/x/y/z").unwrap();

    for dir in ["/x", "/x/y", "/x/y/z"] {
        assert!(fs.is_dir(dir));
        assert_eq!(fs.stat(dir).unwrap().link_count, 2);
    }

    // Existing segments are fine
    fs.mkdir_p("/x/y/z").unwrap();
    fs.mkdir_p("/x").unwrap();
}

#[test]
fn test_rm_non_empty_directory() {
    let mut fs = empty();
    fs.mkdir_p("/a/b/c").unwrap();
    fs.write_file("/a/b/file", "data").unwrap();
    let before = shape(&fs);

    let err = fs.rm("/a/b", false).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DirectoryNotEmpty);
    assert_eq!(shape(&fs), before);

    fs.rm("/a/b", true).unwrap();
    assert!(!fs.exists("/a/b"));
    assert!(fs.is_dir("/a"));
}

#[test]
fn test_write_read_append() {
    let mut fs = empty();
    fs.write_file("/f", "hello").unwrap();
    assert_eq!(fs.read_to_string("/f").unwrap(), "hello");

    fs.append_file("/f", " world").unwrap();
    assert_eq!(fs.read_to_string("/f").unwrap(), "hello world");
    assert_eq!(fs.stat("/f").unwrap().size, 11);
}

#[test]
fn test_du_sums_file_bytes() {
    let mut fs = empty();
    fs.write_file("/d/a", "abc").unwrap();
    fs.write_file("/d/b", "12345").unwrap();

    let usage = fs.du("/d").unwrap();
    assert_eq!(usage.bytes, 8);
    assert_eq!(usage.blocks(), 1);
    assert_eq!(fs.du("/nope").unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn test_find_filters_by_name_and_type() {
    let mut fs = empty();
    fs.write_file("/root/one.txt", "1").unwrap();
    fs.write_file("/root/two.log", "2").unwrap();
    fs.mkdir("/root/sub", 0o755).unwrap();

    assert_eq!(
        fs.find("/root", &FindOptions::name("*.txt")).unwrap(),
        vec!["/root/one.txt"]
    );
    assert_eq!(
        fs.find("/root", &FindOptions::kind(FindType::Directory)).unwrap(),
        vec!["/root", "/root/sub"]
    );
    assert!(fs.find("/missing", &FindOptions::default()).unwrap().is_empty());
}

#[test]
fn test_find_rejects_malformed_glob() {
    let fs = empty();
    let err = fs.find("/", &FindOptions::name("[abc")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidPattern);
}

#[test]
fn test_find_with_leading_bracket_class() {
    let mut fs = empty();
    fs.write_file("/srv/]notes", "x").unwrap();
    fs.write_file("/srv/notes", "y").unwrap();
    assert_eq!(
        fs.find("/srv", &FindOptions::name("[]]*")).unwrap(),
        vec!["/srv/]notes"]
    );
}

#[test]
fn test_seeded_file_modes() {
    let (fs, _) = seeded();
    for path in fs.find("/", &FindOptions::kind(FindType::File)).unwrap() {
        let expected = match path.as_str() {
            "/etc/shadow" => "0640",
            p if p.starts_with("/proc/") => "0444",
            _ => "0644",
        };
        assert_eq!(fs.stat(&path).unwrap().mode_octal, expected, "{}", path);
    }
}

#[test]
fn test_chown_requires_root() {
    let (mut fs, clock) = seeded();
    fs.write_file("~/report.txt", "q1").unwrap();
    let before = fs.stat("~/report.txt").unwrap();

    let err = fs.chown("~/report.txt", Some("root"), Some("root")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    let after = fs.stat("~/report.txt").unwrap();
    assert_eq!((after.uid, after.gid), (before.uid, before.gid));
    assert_eq!(after.ctime, before.ctime);

    fs.switch_user("root").unwrap();
    clock.advance(60_000);
    fs.chown("/home/student/report.txt", Some("www-data"), Some("www-data"))
        .unwrap();

    let owned = fs.stat("/home/student/report.txt").unwrap();
    assert_eq!(owned.owner, "www-data");
    assert_eq!(owned.group, "www-data");
    assert_eq!(owned.ctime, START + 60_000);
}

#[test]
fn test_mv_moves_file_into_directory() {
    let (mut fs, _) = seeded();
    fs.write_file("~/draft.md", "# draft").unwrap();
    let dest = fs.mv("~/draft.md", "~/projects").unwrap();

    assert_eq!(dest, "/home/student/projects/draft.md");
    assert!(!fs.exists("~/draft.md"));
    assert_eq!(fs.read_to_string(&dest).unwrap(), "# draft");
}

#[test]
fn test_cp_of_directory_fails() {
    let (mut fs, _) = seeded();
    let err = fs.cp("~/projects", "/tmp/projects").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::IsADirectory);
    assert!(!fs.exists("/tmp/projects"));
}

#[test]
fn test_ls_long_of_seeded_tmp() {
    let (fs, _) = seeded();
    let entries = fs.ls("/", ListOptions::long()).unwrap();
    let tmp = entries.iter().find(|e| e.name == "tmp").unwrap();
    let long = tmp.long.as_ref().unwrap();
    assert_eq!(long.permissions, "drwxrwxrwx");
    assert_eq!(long.owner, "root");
    assert_eq!(long.modified, "Mar  4 09:15");
}

#[test]
fn test_reset_is_deterministic() {
    let (mut fs, clock) = seeded();
    let seeded_shape = shape(&fs);

    fs.write_file("/tmp/scratch", "junk").unwrap();
    fs.rm("/etc/hosts", false).unwrap();
    fs.chdir("/var/log").unwrap();

    clock.advance(3_600_000);
    fs.reset_to_lesson(|_| Ok(())).unwrap();
    let first = shape(&fs);

    clock.advance(3_600_000);
    fs.reset_to_lesson(|_| Ok(())).unwrap();
    let second = shape(&fs);

    assert_eq!(first, second);
    assert_eq!(first, seeded_shape);
    assert_eq!(fs.cwd(), "/home/student");
}

#[test]
fn test_lesson_setup_customizes_fresh_tree() {
    let (mut fs, _) = seeded();
    fs.reset_to_lesson(|fs| {
        fs.write_file("/etc/nginx/nginx.conf", "events {\n")?;
        fs.chmod("/var/log/nginx/error.log", 0o600)?;
        Ok(())
    })
    .unwrap();

    assert_eq!(fs.read_to_string("/etc/nginx/nginx.conf").unwrap(), "events {\n");
    assert_eq!(fs.stat("/var/log/nginx/error.log").unwrap().mode_octal, "0600");

    fs.reset().unwrap();
    assert_ne!(fs.read_to_string("/etc/nginx/nginx.conf").unwrap(), "events {\n");
}

#[test]
fn test_lesson_setup_error_is_returned() {
    let (mut fs, _) = seeded();
    let err = fs
        .reset_to_lesson(|fs| fs.mkdir("/no/such/parent", 0o755))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_prompt_and_snapshot() {
    let (mut fs, _) = seeded();
    assert_eq!(fs.prompt(), "student@lab-server:~$ ");

    fs.chdir("/etc").unwrap();
    assert_eq!(fs.prompt(), "student@lab-server:/etc$ ");

    let json = fs.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["cwd"], "/etc");
    assert_eq!(value["current_uid"], 1000);
    assert_eq!(value["env"]["PWD"], "/etc");
}
