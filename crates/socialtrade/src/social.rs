//! Social-feed export parser.
//!
//! The export has no fixed record layout. After a short header (display
//! name, optional repeated name, optional `@handle`, optional column banner)
//! every line is classified by shape and fed through a small state machine
//! that buffers one post at a time:
//!
//! ```text
//! Ann                      <- display name
//! Ann                      <- repeated name (skipped)
//! @ann                     <- handle
//! User	Tweet	Date	Stats	Link
//! Ann                      <- post boundary
//! gm @bob                  <- body text
//! 1/2/2024, 3:04:05 PM     <- date
//! 10 Likes
//! 2 Retweets
//! ```

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::lines::{read_text, tokenize, Line};
use crate::numeric::parse_count;
use crate::types::{ExportResult, Post, SocialProfile};

/// Column banner some export tools print after the header.
pub const COLUMN_BANNER: &str = "User\tTweet\tDate\tStats\tLink";

/// Placeholder printed where a post's link could not be resolved.
const LINK_PLACEHOLDER: &str = "Link unavailable";

static HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@\w+").expect("handle regex is valid"));
static LIKES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d[\d,]*) Likes").expect("likes regex is valid"));
static SHARES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d[\d,]*) Retweets").expect("shares regex is valid"));
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+/\d+/\d+, \d+:\d+:\d+ [AP]M").expect("date regex is valid")
});

/// Parse a social export from its text.
pub fn parse_social(text: &str) -> SocialProfile {
    let lines = tokenize(text);
    if lines.is_empty() {
        return SocialProfile::empty();
    }

    let header = read_header(&lines);
    let mut state = FeedState::new();
    for line in lines[header.body_start..].iter().filter(|l| !l.is_blank()) {
        let kind = classify(line.text, header.display_name);
        state = state.step(kind, &header);
    }

    let mut posts = state.finish();
    if posts.is_empty() {
        posts.push(Post::sentinel());
    }

    tracing::debug!(
        "Parsed social export for {:?}: {} posts",
        header.display_name,
        posts.len()
    );

    SocialProfile {
        display_name: header.display_name.to_string(),
        handle: header.handle,
        posts,
    }
}

/// Read and parse a social export file.
pub fn read_social(path: &Path) -> ExportResult<SocialProfile> {
    let text = read_text(path)?;
    Ok(parse_social(&text))
}

/// Header fields and where post content starts.
#[derive(Debug)]
struct Header<'a> {
    display_name: &'a str,
    handle: String,
    body_start: usize,
}

fn read_header<'a>(lines: &[Line<'a>]) -> Header<'a> {
    let display_name = lines[0].text;
    let mut cursor = 1;

    // Some tools print the name twice. A first post whose text is exactly
    // the display name is lost to this.
    if lines.get(cursor).is_some_and(|l| l.text == display_name) {
        cursor += 1;
    }

    let mut handle = String::new();
    if let Some(m) = lines.get(cursor).and_then(|l| HANDLE_RE.find(l.text)) {
        handle = m.as_str().to_string();
        cursor += 1;
    }

    if lines.get(cursor).is_some_and(|l| l.text == COLUMN_BANNER) {
        cursor += 1;
    }

    Header {
        display_name,
        handle,
        body_start: cursor,
    }
}

/// What a content line means for the post being buffered.
#[derive(Debug, PartialEq)]
enum FeedLine<'a> {
    Boundary,
    Likes(Option<u64>),
    Shares(Option<u64>),
    Date(&'a str),
    Body(&'a str),
    Ignored,
}

fn classify<'a>(line: &'a str, display_name: &str) -> FeedLine<'a> {
    // An empty display name makes every line a boundary.
    if line.starts_with(display_name) {
        FeedLine::Boundary
    } else if line.contains("Likes") {
        FeedLine::Likes(leading_count(&LIKES_RE, line))
    } else if line.contains("Retweets") {
        FeedLine::Shares(leading_count(&SHARES_RE, line))
    } else if DATE_RE.is_match(line) {
        FeedLine::Date(line)
    } else if line.contains(LINK_PLACEHOLDER) || line.starts_with('@') {
        FeedLine::Ignored
    } else {
        FeedLine::Body(line)
    }
}

fn leading_count(re: &Regex, line: &str) -> Option<u64> {
    re.captures(line).and_then(|c| parse_count(&c[1]))
}

/// A post that has not been committed yet.
#[derive(Debug, Default)]
struct PostDraft {
    author: String,
    handle: String,
    text: Option<String>,
    date: Option<String>,
    likes: Option<u64>,
    shares: Option<u64>,
}

impl PostDraft {
    fn open(author: &str, handle: &str) -> Self {
        Self {
            author: author.to_string(),
            handle: handle.to_string(),
            ..Self::default()
        }
    }

    /// A draft only becomes a post once it has body text.
    fn commit(self) -> Option<Post> {
        let text = self.text?;
        Some(Post {
            author: self.author,
            handle: self.handle,
            text,
            date: self.date,
            likes: self.likes,
            shares: self.shares,
        })
    }
}

#[derive(Debug)]
struct FeedState {
    posts: Vec<Post>,
    /// Lines before the first boundary fill an orphan draft with no author.
    draft: PostDraft,
}

impl FeedState {
    fn new() -> Self {
        Self {
            posts: Vec::new(),
            draft: PostDraft::default(),
        }
    }

    fn step(mut self, line: FeedLine<'_>, header: &Header<'_>) -> Self {
        match line {
            FeedLine::Boundary => {
                let previous = std::mem::replace(
                    &mut self.draft,
                    PostDraft::open(header.display_name, &header.handle),
                );
                self.posts.extend(previous.commit());
            }
            FeedLine::Likes(count) => {
                if count.is_some() {
                    self.draft.likes = count;
                }
            }
            FeedLine::Shares(count) => {
                if count.is_some() {
                    self.draft.shares = count;
                }
            }
            FeedLine::Date(date) => self.draft.date = Some(date.to_string()),
            FeedLine::Body(text) => {
                if self.draft.text.is_none() {
                    self.draft.text = Some(text.to_string());
                }
            }
            FeedLine::Ignored => {}
        }
        self
    }

    fn finish(mut self) -> Vec<Post> {
        self.posts.extend(self.draft.commit());
        self.posts
    }
}
