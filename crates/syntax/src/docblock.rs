//! PHPDoc docblock parsing.
//!
//! Docblocks arrive as raw `/** ... */` comment text. The parser splits
//! them into a summary and a list of tags; tags of different shapes are a
//! single sum type discriminated by variant, so consumers match instead of
//! downcasting.

/// Access direction of a `@property*` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MagicAccess {
    ReadWrite,
    ReadOnly,
    WriteOnly,
}

/// One parameter inside a `@method` tag signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MagicParameter {
    pub name: String,
    pub type_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocblockTag {
    /// `@param Type $name description`
    Param {
        name: String,
        type_text: String,
        description: String,
    },
    /// `@return Type description`
    Return {
        type_text: String,
        description: String,
    },
    /// `@var Type [$name] description`
    Var {
        name: Option<String>,
        type_text: String,
        description: String,
    },
    /// `@property[-read|-write] Type $name description`
    Property {
        name: String,
        type_text: String,
        access: MagicAccess,
        description: String,
    },
    /// `@method [static] [Type] name(Type $p, ...) description`
    Method {
        name: String,
        is_static: bool,
        return_type: String,
        parameters: Vec<MagicParameter>,
        description: String,
    },
    /// Any tag the semantic layers do not interpret.
    Other { name: String, text: String },
}

/// A parsed docblock: leading free text plus tags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Docblock {
    pub summary: String,
    pub tags: Vec<DocblockTag>,
}

impl Docblock {
    /// Parse raw `/** ... */` text. Returns an empty docblock for input
    /// that is not a docblock comment.
    pub fn parse(raw: &str) -> Self {
        let Some(body) = strip_delimiters(raw) else {
            return Self::default();
        };

        let mut summary_lines: Vec<&str> = Vec::new();
        let mut tag_blocks: Vec<String> = Vec::new();

        for line in body.lines().map(clean_line) {
            if let Some(rest) = line.strip_prefix('@') {
                tag_blocks.push(rest.to_string());
            } else if let Some(current) = tag_blocks.last_mut() {
                // Continuation line of the previous tag.
                if !line.is_empty() {
                    current.push(' ');
                    current.push_str(line);
                }
            } else {
                summary_lines.push(line);
            }
        }

        while summary_lines.last().is_some_and(|l| l.is_empty()) {
            summary_lines.pop();
        }
        while summary_lines.first().is_some_and(|l| l.is_empty()) {
            summary_lines.remove(0);
        }

        Self {
            summary: summary_lines.join("\n"),
            tags: tag_blocks.iter().map(|block| parse_tag(block)).collect(),
        }
    }

    pub fn param(&self, name: &str) -> Option<&DocblockTag> {
        self.tags.iter().find(
            |tag| matches!(tag, DocblockTag::Param { name: n, .. } if n == name),
        )
    }

    pub fn return_tag(&self) -> Option<&DocblockTag> {
        self.tags.iter().find(|tag| matches!(tag, DocblockTag::Return { .. }))
    }

    pub fn var_tag(&self) -> Option<&DocblockTag> {
        self.tags.iter().find(|tag| matches!(tag, DocblockTag::Var { .. }))
    }
}

fn strip_delimiters(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    let body = trimmed.strip_prefix("/**")?;
    Some(body.strip_suffix("*/").unwrap_or(body))
}

/// Remove the leading ` * ` gutter of a docblock line.
fn clean_line(line: &str) -> &str {
    let stripped = line.trim_start();
    let stripped = stripped.strip_prefix('*').unwrap_or(stripped);
    stripped.strip_prefix(' ').unwrap_or(stripped).trim_end()
}

fn parse_tag(block: &str) -> DocblockTag {
    let (tag_name, rest) = split_word(block);
    let rest = rest.trim_start();
    match tag_name {
        "param" => {
            let (type_text, rest) = split_word(rest);
            let (name, description) = split_word(rest.trim_start());
            DocblockTag::Param {
                name: name.trim_start_matches('$').to_string(),
                type_text: type_text.to_string(),
                description: description.trim().to_string(),
            }
        }
        "return" => {
            let (type_text, description) = split_word(rest);
            DocblockTag::Return {
                type_text: type_text.to_string(),
                description: description.trim().to_string(),
            }
        }
        "var" => {
            let (type_text, rest) = split_word(rest);
            let rest = rest.trim_start();
            let (name, description) = if rest.starts_with('$') {
                let (n, d) = split_word(rest);
                (Some(n.trim_start_matches('$').to_string()), d)
            } else {
                (None, rest)
            };
            DocblockTag::Var {
                name,
                type_text: type_text.to_string(),
                description: description.trim().to_string(),
            }
        }
        "property" | "property-read" | "property-write" => {
            let access = match tag_name {
                "property-read" => MagicAccess::ReadOnly,
                "property-write" => MagicAccess::WriteOnly,
                _ => MagicAccess::ReadWrite,
            };
            let (type_text, rest) = split_word(rest);
            let (name, description) = split_word(rest.trim_start());
            DocblockTag::Property {
                name: name.trim_start_matches('$').to_string(),
                type_text: type_text.to_string(),
                access,
                description: description.trim().to_string(),
            }
        }
        "method" => parse_method_tag(rest),
        other => DocblockTag::Other {
            name: other.to_string(),
            text: rest.to_string(),
        },
    }
}

/// `@method` signatures: `[static] [ReturnType] name([Type] $p, ...)`.
fn parse_method_tag(rest: &str) -> DocblockTag {
    let mut rest = rest.trim_start();
    let is_static = if let Some(after) = rest.strip_prefix("static ") {
        rest = after.trim_start();
        true
    } else {
        false
    };

    let paren = rest.find('(');
    let (head, tail) = match paren {
        Some(idx) => (&rest[..idx], &rest[idx..]),
        None => (rest, ""),
    };

    // Two words before the parens mean return type + name; one means the
    // return type was omitted.
    let head_words: Vec<&str> = head.split_whitespace().collect();
    let (return_type, name) = match head_words.as_slice() {
        [name] => (String::new(), (*name).to_string()),
        [ty, name, ..] => ((*ty).to_string(), (*name).to_string()),
        [] => (String::new(), String::new()),
    };

    let (parameters, description) = match tail.find(')') {
        Some(close) => (
            parse_magic_parameters(&tail[1..close]),
            tail[close + 1..].trim().to_string(),
        ),
        None => (Vec::new(), tail.trim().to_string()),
    };

    DocblockTag::Method {
        name,
        is_static,
        return_type,
        parameters,
        description,
    }
}

fn parse_magic_parameters(list: &str) -> Vec<MagicParameter> {
    list.split(',')
        .filter_map(|entry| {
            let entry = entry.trim();
            if entry.is_empty() {
                return None;
            }
            let (first, second) = split_word(entry);
            if first.starts_with('$') {
                Some(MagicParameter {
                    name: first.trim_start_matches('$').to_string(),
                    type_text: String::new(),
                })
            } else {
                let (name, _) = split_word(second.trim_start());
                Some(MagicParameter {
                    name: name.trim_start_matches('$').to_string(),
                    type_text: first.to_string(),
                })
            }
        })
        .filter(|p| !p.name.is_empty())
        .collect()
}

fn split_word(text: &str) -> (&str, &str) {
    match text.find(char::is_whitespace) {
        Some(idx) => (&text[..idx], &text[idx..]),
        None => (text, ""),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_summary_and_param_tags() {
        let doc = Docblock::parse(
            "/**\n * Finds a user.\n *\n * @param int $id the identifier\n * @return User|null\n */",
        );
        assert_eq!(doc.summary, "Finds a user.");
        assert_eq!(
            doc.param("id"),
            Some(&DocblockTag::Param {
                name: "id".into(),
                type_text: "int".into(),
                description: "the identifier".into(),
            })
        );
        assert_eq!(
            doc.return_tag(),
            Some(&DocblockTag::Return {
                type_text: "User|null".into(),
                description: String::new(),
            })
        );
    }

    #[test]
    fn parses_property_variants() {
        let doc = Docblock::parse(
            "/** @property string $x\n * @property-read int $y\n * @property-write Foo $z */",
        );
        let accesses: Vec<MagicAccess> = doc
            .tags
            .iter()
            .filter_map(|t| match t {
                DocblockTag::Property { access, .. } => Some(*access),
                _ => None,
            })
            .collect();
        assert_eq!(
            accesses,
            vec![MagicAccess::ReadWrite, MagicAccess::ReadOnly, MagicAccess::WriteOnly]
        );
    }

    #[test]
    fn parses_method_tag_with_parameters() {
        let doc = Docblock::parse("/** @method static User find(int $id, string $mode) Looks up. */");
        match &doc.tags[0] {
            DocblockTag::Method {
                name,
                is_static,
                return_type,
                parameters,
                description,
            } => {
                assert_eq!(name, "find");
                assert!(is_static);
                assert_eq!(return_type, "User");
                assert_eq!(
                    parameters,
                    &vec![
                        MagicParameter { name: "id".into(), type_text: "int".into() },
                        MagicParameter { name: "mode".into(), type_text: "string".into() },
                    ]
                );
                assert_eq!(description, "Looks up.");
            }
            other => panic!("expected method tag, got {other:?}"),
        }
    }

    #[test]
    fn var_tag_name_is_optional() {
        let doc = Docblock::parse("/** @var string */");
        assert_eq!(
            doc.var_tag(),
            Some(&DocblockTag::Var {
                name: None,
                type_text: "string".into(),
                description: String::new(),
            })
        );
    }

    #[test]
    fn non_docblock_comment_parses_empty() {
        let doc = Docblock::parse("// just a line comment");
        assert!(doc.summary.is_empty());
        assert!(doc.tags.is_empty());
    }
}
