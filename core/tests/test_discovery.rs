#[cfg(test)]
mod tests {
    use bulkcrypt_core::discovery::collect_files;
    use bulkcrypt_core::types::FailureKind;
    use tempfile::tempdir;

    #[test]
    fn file_root_is_single_entry() {
        let dir = tempdir().unwrap();
        let f = dir.path().join("only.txt");
        std::fs::write(&f, b"x").unwrap();
        assert_eq!(collect_files(&f).unwrap(), vec![f]);
    }

    #[test]
    fn directory_root_is_recursive_and_sorted() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("b/inner")).unwrap();
        std::fs::create_dir_all(root.join("a")).unwrap();
        std::fs::create_dir_all(root.join("empty")).unwrap();
        for rel in ["z.txt", "b/inner/deep.txt", "a/one.txt", "b/two.txt"] {
            std::fs::write(root.join(rel), rel.as_bytes()).unwrap();
        }

        let files = collect_files(root).unwrap();
        let rel: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(rel, vec!["a/one.txt", "b/inner/deep.txt", "b/two.txt", "z.txt"]);
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = tempdir().unwrap();
        assert!(collect_files(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn missing_root_is_not_found() {
        let dir = tempdir().unwrap();
        let err = collect_files(&dir.path().join("absent")).unwrap_err();
        assert_eq!(err.kind(), FailureKind::NotFound);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_not_followed() {
        let dir = tempdir().unwrap();
        let outside = tempdir().unwrap();
        std::fs::write(outside.path().join("secret.txt"), b"s").unwrap();
        std::fs::write(dir.path().join("real.txt"), b"r").unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real.txt"), dir.path().join("alias.txt")).unwrap();

        let files = collect_files(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("real.txt")]);
    }
}
