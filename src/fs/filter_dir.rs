//! Filtering file system: records served paths in dev mode, restricts them
//! to the allow-list in prod mode.
//!
//! One `FilterDir` lives for the whole server process. In dev mode the first
//! successful open starts a session: the collector worker plus, when a
//! terminal console is configured, the interactive controller. In prod mode
//! the first open freezes the include list into an [`AllowSet`].

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock, Weak};
use std::thread::JoinHandle;

use parking_lot::{Mutex, RwLock};

use super::{AllowSet, DirListing, FileInfo, FsFile, OsDir, ReadOnlyFs, not_found};
use crate::codegen::{AssetEmbedder, ListTemplate, SourceEmbedder, write_list_file};
use crate::collector::{CollectorHandle, spawn_collector};
use crate::core::errors::Result;
use crate::core::options::{EmbedOptions, Options};

/// Which behavior `open` has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Every path is served and observed.
    Dev,
    /// Only allow-listed paths are visible.
    Prod,
}

/// What the dev session attaches to the collector.
#[derive(Debug, Clone)]
pub enum Console {
    /// Full-screen interactive controller on the process terminal.
    #[cfg(feature = "tui")]
    Terminal(crate::tui::ControllerConfig),
    /// Collector only; the host drives it through [`FilterDir::collector`].
    Headless,
}

impl Default for Console {
    fn default() -> Self {
        #[cfg(feature = "tui")]
        {
            Self::Terminal(crate::tui::ControllerConfig::default())
        }
        #[cfg(not(feature = "tui"))]
        {
            Self::Headless
        }
    }
}

/// Actions the terminal controller triggers. The controller only holds a
/// `Weak` reference, so a dropped `FilterDir` turns actions into errors.
pub trait SessionActions: Send + Sync {
    /// Persist `list` as the list file. Returns the written path.
    fn save(&self, list: &[String]) -> Result<PathBuf>;

    /// Embed the files admitted by `list`. Returns the written path.
    fn generate(&self, list: &[String]) -> Result<PathBuf>;
}

// ──────────────────── state ────────────────────

struct DevSession {
    collector: CollectorHandle,
}

struct Inner {
    fs: Arc<dyn ReadOnlyFs>,
    options: Options,
    prod: AtomicBool,
    include_list: RwLock<Vec<String>>,
    allow: OnceLock<Arc<AllowSet>>,
    session: OnceLock<Option<DevSession>>,
    console: Console,
    console_join: Mutex<Option<JoinHandle<()>>>,
    embedder: Arc<dyn AssetEmbedder>,
    list_template: ListTemplate,
}

impl Inner {
    fn allow_set(&self) -> &Arc<AllowSet> {
        self.allow.get_or_init(|| {
            let list = self.include_list.read();
            let set = AllowSet::build(list.iter());
            tracing::debug!(entries = list.len(), admitted = set.len(), "allow-set built");
            Arc::new(set)
        })
    }

    fn prod_view(&self, list: &[String]) -> FilterDir {
        let view = FilterDir::builder(Arc::clone(&self.fs), self.options.clone())
            .console(Console::Headless)
            .embedder(Arc::clone(&self.embedder))
            .list_template(self.list_template.clone())
            .build();
        view.set_include_list(list.to_vec());
        view.set_prod_mode(true);
        view
    }
}

impl SessionActions for Inner {
    fn save(&self, list: &[String]) -> Result<PathBuf> {
        let path = PathBuf::from(&self.options.list_file_name);
        write_list_file(&path, list, &self.options, &self.list_template)?;
        Ok(path)
    }

    fn generate(&self, list: &[String]) -> Result<PathBuf> {
        let view = self.prod_view(list);
        self.embedder.embed(&view, &self.options.embed_options())
    }
}

// ──────────────────── builder ────────────────────

/// Configures the collaborators of a [`FilterDir`].
pub struct FilterDirBuilder {
    fs: Arc<dyn ReadOnlyFs>,
    options: Options,
    console: Console,
    embedder: Arc<dyn AssetEmbedder>,
    list_template: ListTemplate,
}

impl FilterDirBuilder {
    #[must_use]
    pub fn console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }

    #[must_use]
    pub fn embedder(mut self, embedder: Arc<dyn AssetEmbedder>) -> Self {
        self.embedder = embedder;
        self
    }

    #[must_use]
    pub fn list_template(mut self, template: ListTemplate) -> Self {
        self.list_template = template;
        self
    }

    #[must_use]
    pub fn build(self) -> FilterDir {
        let mut options = self.options;
        options.fill_missing();
        FilterDir {
            inner: Arc::new(Inner {
                fs: self.fs,
                options,
                prod: AtomicBool::new(false),
                include_list: RwLock::new(Vec::new()),
                allow: OnceLock::new(),
                session: OnceLock::new(),
                console: self.console,
                console_join: Mutex::new(None),
                embedder: self.embedder,
                list_template: self.list_template,
            }),
        }
    }
}

// ──────────────────── FilterDir ────────────────────

/// Read-only file-system middleware over another [`ReadOnlyFs`].
///
/// Cloning is cheap and every clone shares mode, include list and session.
#[derive(Clone)]
pub struct FilterDir {
    inner: Arc<Inner>,
}

impl FilterDir {
    /// Wrap `fs` with default collaborators.
    #[must_use]
    pub fn new(fs: Arc<dyn ReadOnlyFs>, options: Options) -> Self {
        Self::builder(fs, options).build()
    }

    /// Wrap the directory `root` on disk.
    #[must_use]
    pub fn open_dir(root: impl AsRef<Path>, options: Options) -> Self {
        Self::new(Arc::new(OsDir::new(root.as_ref())), options)
    }

    #[must_use]
    pub fn builder(fs: Arc<dyn ReadOnlyFs>, options: Options) -> FilterDirBuilder {
        FilterDirBuilder {
            fs,
            options,
            console: Console::default(),
            embedder: Arc::new(SourceEmbedder),
            list_template: ListTemplate::default(),
        }
    }

    /// Options with defaults filled in.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.inner.options
    }

    /// Options handed to the asset embedder.
    #[must_use]
    pub fn embed_options(&self) -> EmbedOptions {
        self.inner.options.embed_options()
    }

    pub fn set_prod_mode(&self, prod: bool) {
        self.inner.prod.store(prod, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_prod_mode(&self) -> bool {
        self.inner.prod.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.is_prod_mode() { Mode::Prod } else { Mode::Dev }
    }

    /// Replace the include list. Has no effect once prod mode has served a
    /// request, because the allow-set is built only once.
    pub fn set_include_list(&self, list: Vec<String>) {
        if self.inner.allow.get().is_some() {
            tracing::warn!("include list changed after the allow-set was built; ignored");
        }
        *self.inner.include_list.write() = list;
    }

    /// Append to the include list, as a generated list file does.
    pub fn extend_include_list<I, S>(&self, entries: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inner
            .include_list
            .write()
            .extend(entries.into_iter().map(Into::into));
    }

    #[must_use]
    pub fn include_list(&self) -> Vec<String> {
        self.inner.include_list.read().clone()
    }

    /// A prod-mode view over the same underlying files, admitting `list`.
    #[must_use]
    pub fn prod_view(&self, list: &[String]) -> Self {
        self.inner.prod_view(list)
    }

    /// Collector of the dev session, if one has started.
    #[must_use]
    pub fn collector(&self) -> Option<CollectorHandle> {
        self.inner
            .session
            .get()
            .and_then(Option::as_ref)
            .map(|s| s.collector.clone())
    }

    /// Observations dropped because the collector fell behind.
    #[must_use]
    pub fn dropped_observations(&self) -> u64 {
        self.collector().map_or(0, |c| c.observer().dropped())
    }

    /// Block until the terminal controller (if any) has exited.
    pub fn wait_for_console(&self) {
        let join = self.inner.console_join.lock().take();
        if let Some(join) = join {
            if join.join().is_err() {
                tracing::warn!("terminal controller thread panicked");
            }
        }
    }

    /// Write `list` to the configured list file.
    pub fn save_list(&self, list: &[String]) -> Result<PathBuf> {
        self.inner.save(list)
    }

    /// Run the embedder over a prod view admitting `list`.
    pub fn generate_assets(&self, list: &[String]) -> Result<PathBuf> {
        self.inner.generate(list)
    }

    /// Open `name`, observing it (dev) or enforcing the allow-list (prod).
    pub fn open(&self, name: &str) -> io::Result<Box<dyn FsFile>> {
        let file = self.inner.fs.open(name)?;

        if !self.is_prod_mode() {
            if let Some(session) = self.session() {
                session.collector.observer().observe(name);
            }
            return Ok(file);
        }

        let allow = self.inner.allow_set();
        if !allow.contains(admission_key(name)) {
            drop(file);
            return Err(not_found(name));
        }
        Ok(Box::new(FilteredFile {
            file,
            name: name.to_string(),
            allow: Arc::clone(allow),
        }))
    }

    /// Back-reference handed to the controller. It does not keep the file
    /// system alive.
    #[cfg_attr(not(feature = "tui"), allow(dead_code))]
    fn session_actions(&self) -> Weak<dyn SessionActions> {
        let strong: Arc<dyn SessionActions> = Arc::clone(&self.inner) as Arc<dyn SessionActions>;
        Arc::downgrade(&strong)
    }

    fn session(&self) -> Option<&DevSession> {
        self.inner
            .session
            .get_or_init(|| self.start_session())
            .as_ref()
    }

    fn start_session(&self) -> Option<DevSession> {
        let (collector, _worker) = match spawn_collector() {
            Ok(spawned) => spawned,
            Err(err) => {
                tracing::error!(error = %err, "collector failed to start; observations disabled");
                return None;
            }
        };
        tracing::debug!("dev session started");

        match &self.inner.console {
            #[cfg(feature = "tui")]
            Console::Terminal(config) => {
                self.spawn_console(collector.clone(), config.clone());
            }
            Console::Headless => {}
        }
        Some(DevSession { collector })
    }

    #[cfg(feature = "tui")]
    fn spawn_console(&self, collector: CollectorHandle, config: crate::tui::ControllerConfig) {
        let actions = self.session_actions();
        let spawned = std::thread::Builder::new()
            .name("spa-assets-term".to_string())
            .spawn(move || {
                if let Err(err) = crate::tui::run_controller(&collector, &actions, config) {
                    if err.is_fatal() {
                        tracing::error!(error = %err, "terminal controller failed");
                        eprintln!("[SPA-TERM] {err}");
                        std::process::exit(1);
                    }
                    tracing::warn!(error = %err, "terminal controller stopped");
                }
            });
        match spawned {
            Ok(join) => *self.inner.console_join.lock() = Some(join),
            Err(err) => tracing::error!(error = %err, "failed to spawn terminal controller"),
        }
    }
}

/// The path checked against the allow-set: one trailing `/` is ignored,
/// except for the root itself.
fn admission_key(name: &str) -> &str {
    match name.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => name,
    }
}

impl ReadOnlyFs for FilterDir {
    fn open(&self, name: &str) -> io::Result<Box<dyn FsFile>> {
        Self::open(self, name)
    }
}

// ──────────────────── FilteredFile ────────────────────

/// Prod-mode handle whose directory listing hides non-admitted children.
pub struct FilteredFile {
    file: Box<dyn FsFile>,
    name: String,
    allow: Arc<AllowSet>,
}

impl FilteredFile {
    /// Request path this handle was opened with.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Read for FilteredFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl FsFile for FilteredFile {
    fn stat(&self) -> io::Result<FileInfo> {
        self.file.stat()
    }

    fn read_dir(&mut self) -> DirListing {
        let base = self.name.strip_suffix('/').unwrap_or(&self.name);
        let DirListing { entries, error } = self.file.read_dir();
        let entries = entries
            .into_iter()
            .filter(|c| self.allow.contains(&format!("{base}/{}", c.name)))
            .collect();
        DirListing { entries, error }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::*;
    use crate::core::paths::join_request_path;
    use crate::fs::read_all;
    use crate::fs::testing::MemFs;

    fn headless(mem: Arc<MemFs>) -> FilterDir {
        FilterDir::builder(mem, Options::default())
            .console(Console::Headless)
            .build()
    }

    fn prod(paths: &[&str], list: &[&str]) -> FilterDir {
        let dir = headless(MemFs::shared(paths));
        dir.set_include_list(list.iter().map(ToString::to_string).collect());
        dir.set_prod_mode(true);
        dir
    }

    #[test]
    fn dev_mode_serves_everything_and_observes() {
        let dir = headless(MemFs::shared(&["/index.html", "/app.js"]));
        assert_eq!(dir.mode(), Mode::Dev);
        assert!(dir.collector().is_none());

        let mut file = dir.open("/app.js").unwrap();
        assert_eq!(read_all(file.as_mut()).unwrap(), b"body of /app.js");
        dir.open("/index.html").unwrap();
        dir.open("/app.js").unwrap();

        let collector = dir.collector().unwrap();
        assert_eq!(collector.list(), vec!["/app.js", "/index.html"]);
        collector.shutdown();
    }

    #[test]
    fn failed_dev_open_neither_observes_nor_starts_session() {
        let dir = headless(MemFs::shared(&["/index.html"]));
        let err = dir.open("/missing.js").err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(dir.collector().is_none());
    }

    #[test]
    fn prod_mode_blocks_unlisted_paths() {
        let dir = prod(&["/index.html", "/app.js", "/secret.txt"], &["/index.html", "/app.js"]);
        assert_eq!(dir.mode(), Mode::Prod);
        assert!(dir.open("/app.js").is_ok());
        let err = dir.open("/secret.txt").err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
        assert!(dir.collector().is_none());
    }

    #[test]
    fn prod_mode_propagates_underlying_errors_first() {
        let dir = prod(&["/index.html"], &["/ghost.js"]);
        let err = dir.open("/ghost.js").err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn root_listing_is_filtered() {
        let dir = prod(
            &["/index.html", "/app.js", "/secret.txt", "/static/app/main.js", "/static/x.css"],
            &["/index.html", "/static/app/main.js"],
        );
        let mut root = dir.open("/").unwrap();
        assert_eq!(root.read_dir().names(), vec!["index.html", "static"]);

        let mut nested = dir.open("/static/").unwrap();
        assert_eq!(nested.read_dir().names(), vec!["app"]);
    }

    #[test]
    fn directories_open_with_or_without_trailing_slash() {
        let dir = prod(
            &["/index.html", "/static/app/main.js", "/static/app/secret.map"],
            &["/static/app/main.js"],
        );
        for name in ["/static", "/static/", "/static/app", "/static/app/"] {
            assert!(dir.open(name).is_ok(), "{name}");
        }
        let mut app = dir.open("/static/app/").unwrap();
        assert_eq!(app.read_dir().names(), vec!["main.js"]);
        assert!(dir.open("/static/app/secret.map/").is_err());
        assert!(dir.open("/index.html/").is_err());
    }

    #[test]
    fn session_actions_do_not_outlive_the_file_system() {
        let dir = headless(MemFs::shared(&["/a.js"]));
        let actions = dir.session_actions();
        assert!(actions.upgrade().is_some());
        let clone = dir.clone();
        drop(dir);
        assert!(actions.upgrade().is_some());
        drop(clone);
        assert!(actions.upgrade().is_none());
    }

    #[test]
    fn listing_error_passes_through_with_subset() {
        let mut mem = MemFs::with_files(&["/a.js", "/b.js"]);
        mem.listing_error = Some(io::ErrorKind::PermissionDenied);
        let dir = headless(Arc::new(mem));
        dir.set_include_list(vec!["/a.js".to_string()]);
        dir.set_prod_mode(true);

        let listing = dir.open("/").unwrap().read_dir();
        assert_eq!(listing.names(), vec!["a.js"]);
        assert_eq!(
            listing.error.map(|e| e.kind()),
            Some(io::ErrorKind::PermissionDenied)
        );
    }

    #[test]
    fn allow_set_is_built_once() {
        let dir = prod(&["/a.js", "/b.js"], &["/a.js"]);
        assert!(dir.open("/a.js").is_ok());
        dir.set_include_list(vec!["/b.js".to_string()]);
        assert!(dir.open("/b.js").is_err());
        assert!(dir.open("/a.js").is_ok());
    }

    #[test]
    fn extend_include_list_appends() {
        let dir = headless(MemFs::shared(&[]));
        dir.set_include_list(vec!["/a.js".to_string()]);
        dir.extend_include_list(["/b.js", "/c.js"]);
        assert_eq!(dir.include_list(), vec!["/a.js", "/b.js", "/c.js"]);
    }

    #[test]
    fn prod_view_shares_files_but_not_mode() {
        let mem = MemFs::shared(&["/a.js", "/b.js"]);
        let dir = headless(Arc::clone(&mem));
        let view = dir.prod_view(&["/a.js".to_string()]);
        assert!(view.is_prod_mode());
        assert!(!dir.is_prod_mode());
        assert!(view.open("/b.js").is_err());
        assert!(dir.open("/b.js").is_ok());
        assert!(mem.opened.lock().iter().filter(|p| *p == "/b.js").count() == 2);
    }

    #[test]
    fn save_list_writes_configured_file() {
        let tmp = tempfile::tempdir().unwrap();
        let options = Options {
            list_file_name: tmp.path().join("list.go").display().to_string(),
            ..Options::default()
        };
        let dir = FilterDir::builder(MemFs::shared(&[]), options)
            .console(Console::Headless)
            .build();
        let written = dir.save_list(&["/a.js".to_string()]).unwrap();
        let text = std::fs::read_to_string(written).unwrap();
        assert!(text.contains("\"/a.js\","));
    }

    #[test]
    fn generate_embeds_only_listed_files() {
        let tmp = tempfile::tempdir().unwrap();
        let options = Options {
            filename: tmp.path().join("assets_vfsdata.go").display().to_string(),
            ..Options::default()
        };
        let dir = FilterDir::builder(MemFs::shared(&["/a.js", "/b/c.css", "/d.txt"]), options)
            .console(Console::Headless)
            .build();
        let written = dir
            .generate_assets(&["/a.js".to_string(), "/b/c.css".to_string()])
            .unwrap();
        let text = std::fs::read_to_string(written).unwrap();
        assert!(text.contains("\"/a.js\""));
        assert!(text.contains("\"/b/c.css\""));
        assert!(!text.contains("\"/d.txt\""));
        assert!(!dir.is_prod_mode());
    }

    // ──────────────────── properties ────────────────────

    fn site_path() -> impl Strategy<Value = String> {
        (
            prop::collection::vec(prop::sample::select(vec!["a", "b", "c"]), 0..3),
            prop::sample::select(vec!["x.js", "y.css", "z.map"]),
        )
            .prop_map(|(dirs, file)| {
                let mut path = String::new();
                for dir in dirs {
                    path.push('/');
                    path.push_str(dir);
                }
                join_request_path(&path, file)
            })
    }

    /// A site plus a subset of it used as the include list.
    fn site_and_list() -> impl Strategy<Value = (Vec<String>, Vec<String>)> {
        prop::collection::btree_set(site_path(), 1..12).prop_flat_map(|files| {
            let files: Vec<String> = files.into_iter().collect();
            let len = files.len();
            (Just(files.clone()), prop::sample::subsequence(files, 0..=len))
        })
    }

    /// Every file and every directory of the site, plus the root.
    fn all_paths(files: &[String]) -> BTreeSet<String> {
        let mut out = BTreeSet::from(["/".to_string()]);
        for file in files {
            let mut prefix = String::new();
            let segments: Vec<&str> = file.split('/').filter(|s| !s.is_empty()).collect();
            for segment in segments {
                prefix.push('/');
                prefix.push_str(segment);
                out.insert(prefix.clone());
            }
        }
        out
    }

    fn children(paths: &BTreeSet<String>, dir: &str) -> Vec<String> {
        let prefix = join_request_path(dir, "");
        paths
            .iter()
            .filter_map(|p| p.strip_prefix(&prefix))
            .filter(|rest| !rest.is_empty() && !rest.contains('/'))
            .map(ToString::to_string)
            .collect()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prod_visibility_matches_allow_set((files, list) in site_and_list()) {
            let names: Vec<&str> = files.iter().map(String::as_str).collect();
            let dir = headless(MemFs::shared(&names));
            dir.set_include_list(list.clone());
            dir.set_prod_mode(true);
            let allow = AllowSet::build(&list);
            let paths = all_paths(&files);

            for path in &paths {
                prop_assert_eq!(dir.open(path).is_ok(), allow.contains(path), "{}", path);
            }
            for path in paths.iter().filter(|p| allow.contains(p.as_str())) {
                let opened = dir.open(&join_request_path(path, ""));
                prop_assert!(opened.is_ok(), "{} should open with a trailing slash", path);
                let mut handle = opened.unwrap();
                if handle.stat().map(|i| i.is_dir()).unwrap_or(false) {
                    let expected: Vec<String> = children(&paths, path)
                        .into_iter()
                        .filter(|c| allow.contains(&join_request_path(path, c)))
                        .collect();
                    let listed: Vec<String> =
                        handle.read_dir().names().into_iter().map(ToString::to_string).collect();
                    prop_assert_eq!(listed, expected, "listing of {}", path);
                }
            }
        }

        #[test]
        fn dev_opens_collect_a_sorted_unique_list(
            (files, picks) in prop::collection::btree_set(site_path(), 1..8).prop_flat_map(|files| {
                let files: Vec<String> = files.into_iter().collect();
                let len = files.len();
                (Just(files), prop::collection::vec(0..len, 1..20))
            })
        ) {
            let names: Vec<&str> = files.iter().map(String::as_str).collect();
            let dir = headless(MemFs::shared(&names));
            let mut expected = BTreeSet::new();
            for &i in &picks {
                prop_assert!(dir.open(&files[i]).is_ok());
                expected.insert(files[i].clone());
            }
            let collector = dir.collector().expect("dev session started");
            prop_assert_eq!(collector.list(), expected.into_iter().collect::<Vec<_>>());
            collector.shutdown();
        }
    }
}
