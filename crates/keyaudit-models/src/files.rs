use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What a directory entry turned out to be.
#[derive(Debug)]
pub enum EntryKind {
    File,
    Dir,
    /// Symlinks, sockets and the like; never visited.
    Other,
    /// The entry's type could not be read.
    Unreadable(io::Error),
}

/// Files found below a root, plus the paths that could not be read.
#[derive(Debug, Default)]
pub struct Listing {
    pub files: Vec<PathBuf>,
    pub unreadable: Vec<(PathBuf, io::Error)>,
}

/// Reads one directory at a time. `list_files` walks the whole tree.
pub trait FileLister {
    /// Entries of `dir`, in any order.
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<(PathBuf, EntryKind)>>;

    /// Recursive walk visiting each directory's entries in name order.
    ///
    /// Only a failure to read `root` itself is an error; unreadable entries
    /// further down are collected in [`Listing::unreadable`].
    fn list_files(&self, root: &Path) -> io::Result<Listing> {
        let mut listing = Listing::default();
        let entries = self.read_dir(root)?;
        walk_entries(self, entries, &mut listing);
        Ok(listing)
    }
}

fn walk_entries<L: FileLister + ?Sized>(
    lister: &L,
    mut entries: Vec<(PathBuf, EntryKind)>,
    listing: &mut Listing,
) {
    entries.sort_by(|(left, _), (right, _)| left.file_name().cmp(&right.file_name()));

    for (path, kind) in entries {
        match kind {
            EntryKind::File => listing.files.push(path),
            EntryKind::Dir => match lister.read_dir(&path) {
                Ok(children) => walk_entries(lister, children, listing),
                Err(err) => listing.unreadable.push((path, err)),
            },
            EntryKind::Other => {}
            EntryKind::Unreadable(err) => listing.unreadable.push((path, err)),
        }
    }
}

/// Filesystem lister. Symlinked directories are not followed.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLister;

impl FileLister for FsLister {
    fn read_dir(&self, dir: &Path) -> io::Result<Vec<(PathBuf, EntryKind)>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    entries.push((dir.to_path_buf(), EntryKind::Unreadable(err)));
                    continue;
                }
            };
            let kind = match entry.file_type() {
                Ok(file_type) if file_type.is_dir() => EntryKind::Dir,
                Ok(file_type) if file_type.is_file() => EntryKind::File,
                Ok(_) => EntryKind::Other,
                Err(err) => EntryKind::Unreadable(err),
            };
            entries.push((entry.path(), kind));
        }
        Ok(entries)
    }
}
