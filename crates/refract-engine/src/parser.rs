//! Source parsing with dialect configuration and a bounded parse cache

use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use swc_common::comments::SingleThreadedComments;
use swc_common::sync::Lrc;
use swc_common::{BytePos, FileName, FilePathMapping, SourceFile, SourceMap, Span};
use swc_ecma_ast::Module;
use swc_ecma_parser::{lexer::Lexer, EsSyntax, Parser, StringInput, Syntax, TsSyntax};

use crate::error::{ExtractError, ExtractResult};

/// How long a cached tree stays valid.
const CACHE_TTL: Duration = Duration::from_secs(5);
/// Upper bound on cached trees; the oldest entry is evicted beyond this.
const CACHE_CAPACITY: usize = 10;

/// A named grammar extension enabled when parsing.
///
/// Some names are accepted for compatibility with host settings written for
/// older parsers even though the modern grammar subsumes them; they carry no
/// syntax switch of their own but still participate in the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectPlugin {
    Jsx,
    Typescript,
    Decorators,
    ClassProperties,
    ObjectRestSpread,
    DynamicImport,
    ExportDefaultFrom,
    FunctionBind,
}

impl DialectPlugin {
    /// Resolve a configured plugin name; unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "jsx" => Some(Self::Jsx),
            "typescript" => Some(Self::Typescript),
            "decorators" | "decorators-legacy" => Some(Self::Decorators),
            "classProperties" => Some(Self::ClassProperties),
            "objectRestSpread" => Some(Self::ObjectRestSpread),
            "dynamicImport" => Some(Self::DynamicImport),
            "exportDefaultFrom" => Some(Self::ExportDefaultFrom),
            "functionBind" => Some(Self::FunctionBind),
            _ => None,
        }
    }
}

/// A parsed document: the module, its source map and the original text,
/// plus an eagerly-extracted map of leading comments.
///
/// Shared as `Arc<ParsedSource>` out of the parser cache; a cache hit hands
/// back the same instance, which traversal layers may rely on for
/// memoization but never for correctness.
pub struct ParsedSource {
    pub module: Module,
    pub source: String,
    cm: Lrc<SourceMap>,
    file: Lrc<SourceFile>,
    /// Attach position -> start of the earliest comment attached there.
    leading_comments: HashMap<u32, u32>,
}

impl ParsedSource {
    /// The source map the document was parsed with. Code generation must
    /// reuse it so real spans keep resolving.
    pub fn source_map(&self) -> Lrc<SourceMap> {
        self.cm.clone()
    }

    /// Translate a parser position into a byte offset into `source`.
    pub fn offset_of(&self, pos: BytePos) -> usize {
        (pos.0 - self.file.start_pos.0) as usize
    }

    /// Translate a byte offset into `source` into a parser position.
    pub fn pos_at(&self, offset: usize) -> BytePos {
        BytePos(self.file.start_pos.0 + offset as u32)
    }

    /// The source text a span covers.
    pub fn span_text(&self, span: Span) -> &str {
        &self.source[self.offset_of(span.lo)..self.offset_of(span.hi)]
    }

    /// Whether a span lies entirely within `[start, end)` document offsets.
    pub fn span_within(&self, span: Span, start: usize, end: usize) -> bool {
        self.offset_of(span.lo) >= start && self.offset_of(span.hi) <= end
    }

    /// Start of the earliest comment attached just before `pos`, if any.
    pub fn leading_comment_start(&self, pos: BytePos) -> Option<BytePos> {
        self.leading_comments.get(&pos.0).map(|lo| BytePos(*lo))
    }
}

#[derive(Clone)]
struct CacheEntry {
    parsed: Arc<ParsedSource>,
    created: Instant,
}

/// Parses full documents under a configurable dialect, caching trees by a
/// full-content fingerprint.
///
/// The cache is bounded (oldest-first eviction) and entries expire after a
/// fixed window; changing the dialect drops every cached tree.
pub struct SourceParser {
    plugins: Vec<DialectPlugin>,
    cache: DashMap<u64, CacheEntry>,
    ttl: Duration,
    capacity: usize,
}

impl SourceParser {
    pub fn new(plugin_names: &[String]) -> Self {
        Self::with_cache_policy(plugin_names, CACHE_TTL, CACHE_CAPACITY)
    }

    fn with_cache_policy(plugin_names: &[String], ttl: Duration, capacity: usize) -> Self {
        Self {
            plugins: resolve_plugins(plugin_names),
            cache: DashMap::new(),
            ttl,
            capacity,
        }
    }

    /// Replace the dialect plugin list, invalidating all cached trees.
    pub fn set_plugins(&mut self, plugin_names: &[String]) {
        self.plugins = resolve_plugins(plugin_names);
        self.cache.clear();
        tracing::debug!(plugins = ?self.plugins, "Parser dialect changed, cache cleared");
    }

    /// The syntax the current plugin list maps onto.
    pub fn syntax(&self) -> Syntax {
        let jsx = self.plugins.contains(&DialectPlugin::Jsx);
        let decorators = self.plugins.contains(&DialectPlugin::Decorators);
        if self.plugins.contains(&DialectPlugin::Typescript) {
            Syntax::Typescript(TsSyntax {
                tsx: jsx,
                decorators,
                ..Default::default()
            })
        } else {
            Syntax::Es(EsSyntax {
                jsx,
                decorators,
                export_default_from: self.plugins.contains(&DialectPlugin::ExportDefaultFrom),
                fn_bind: self.plugins.contains(&DialectPlugin::FunctionBind),
                ..Default::default()
            })
        }
    }

    /// Parse a full document, returning a cached tree when the same text was
    /// parsed under the same dialect within the expiry window.
    pub fn parse(&self, text: &str) -> ExtractResult<Arc<ParsedSource>> {
        let key = self.fingerprint(text);
        if let Some(entry) = self.cache.get(&key) {
            if entry.created.elapsed() < self.ttl {
                tracing::trace!(key, "Parse cache hit");
                return Ok(entry.parsed.clone());
            }
        }

        let parsed = Arc::new(self.parse_uncached(text)?);
        self.store(key, parsed.clone());
        tracing::debug!(
            key,
            bytes = text.len(),
            cached = self.cache.len(),
            "Parsed document"
        );
        Ok(parsed)
    }

    fn parse_uncached(&self, text: &str) -> ExtractResult<ParsedSource> {
        let cm: Lrc<SourceMap> = Lrc::new(SourceMap::new(FilePathMapping::empty()));
        let fm = cm.new_source_file(FileName::Anon.into(), text.to_string());
        let comments = SingleThreadedComments::default();

        let lexer = Lexer::new(
            self.syntax(),
            Default::default(),
            StringInput::from(&*fm),
            Some(&comments),
        );
        let mut parser = Parser::new_from(lexer);

        let module = parser
            .parse_module()
            .map_err(|e| ExtractError::parse(format!("Failed to parse document: {:?}", e)))?;

        // A "successful" parse may still have recorded recoverable errors;
        // a tree built from broken input must never enter the cache.
        let recovered = parser.take_errors();
        if let Some(first) = recovered.first() {
            return Err(ExtractError::parse(format!(
                "Document parsed with errors: {:?}",
                first
            )));
        }

        let mut leading_comments = HashMap::new();
        let (leading, _trailing) = comments.take_all();
        for (pos, list) in leading.borrow().iter() {
            if let Some(lo) = list.iter().map(|c| c.span.lo.0).min() {
                leading_comments.insert(pos.0, lo);
            }
        }

        Ok(ParsedSource {
            module,
            source: text.to_string(),
            cm,
            file: fm,
            leading_comments,
        })
    }

    fn store(&self, key: u64, parsed: Arc<ParsedSource>) {
        self.cache.retain(|_, entry| entry.created.elapsed() < self.ttl);
        while self.cache.len() >= self.capacity {
            let oldest = self
                .cache
                .iter()
                .min_by_key(|entry| entry.value().created)
                .map(|entry| *entry.key());
            match oldest {
                Some(k) => {
                    self.cache.remove(&k);
                }
                None => break,
            }
        }
        self.cache.insert(
            key,
            CacheEntry {
                parsed,
                created: Instant::now(),
            },
        );
    }

    fn fingerprint(&self, text: &str) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        text.hash(&mut hasher);
        self.plugins.hash(&mut hasher);
        hasher.finish()
    }
}

fn resolve_plugins(names: &[String]) -> Vec<DialectPlugin> {
    let mut plugins = Vec::new();
    for name in names {
        match DialectPlugin::from_name(name) {
            Some(plugin) => {
                if !plugins.contains(&plugin) {
                    plugins.push(plugin);
                }
            }
            None => {
                tracing::warn!(plugin = %name, "Ignoring unknown parser dialect plugin");
            }
        }
    }
    plugins
}
