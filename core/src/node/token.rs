use super::{Node, NodeId, NodeRef, Replace, Replacement};
use crate::{Vec, vec};
use ecow::EcoString;

/// Lexical category of a [`Token`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Boolean,
    Number,
    Text,
    Name,
    Language,
    Operator,
    Conditional,
    Delete,
    Insert,
    Access,
    ListOpen,
    ListClose,
    EvalOpen,
    EvalClose,
    Bind,
    Function,
    Structure,
    Unknown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub id: NodeId,
    pub text: EcoString,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(text: impl Into<EcoString>, kind: TokenKind) -> Self {
        Self {
            id: NodeId::fresh(),
            text: text.into(),
            kind,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

impl Node for Token {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        Vec::new()
    }
}

impl Replace for Token {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        match with {
            Replacement::Token(token) if self.id == target => token.clone(),
            _ => self.clone(),
        }
    }
}

/// A language tag such as `/en`, attached to names and text.
#[derive(Debug, Clone, PartialEq)]
pub struct Language {
    pub id: NodeId,
    pub code: EcoString,
}

impl Language {
    pub fn new(code: impl Into<EcoString>) -> Self {
        Self {
            id: NodeId::fresh(),
            code: code.into(),
        }
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

impl Node for Language {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        Vec::new()
    }
}

impl Replace for Language {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        match with {
            Replacement::Language(language) if self.id == target => language.clone(),
            _ => self.clone(),
        }
    }
}

/// One alias of a bind or definition, optionally tagged with a language.
#[derive(Debug, Clone, PartialEq)]
pub struct Name {
    pub id: NodeId,
    pub token: Token,
    pub language: Option<Language>,
}

impl Name {
    pub fn new(text: impl Into<EcoString>) -> Self {
        Self {
            id: NodeId::fresh(),
            token: Token::new(text, TokenKind::Name),
            language: None,
        }
    }

    pub fn localized(text: impl Into<EcoString>, language: impl Into<EcoString>) -> Self {
        Self {
            language: Some(Language::new(language)),
            ..Self::new(text)
        }
    }

    pub fn text(&self) -> &str {
        self.token.text()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_ref().map(Language::code)
    }
}

impl Node for Name {
    fn id(&self) -> NodeId {
        self.id
    }

    fn children(&self) -> Vec<NodeRef<'_>> {
        let mut children = vec![NodeRef::Token(&self.token)];
        if let Some(language) = &self.language {
            children.push(NodeRef::Language(language));
        }
        children
    }
}

impl Replace for Name {
    fn replace(&self, target: NodeId, with: &Replacement) -> Self {
        match with {
            Replacement::Name(name) if self.id == target => return name.clone(),
            _ => {}
        }
        Self {
            id: self.id,
            token: self.token.replace(target, with),
            language: self.language.replace(target, with),
        }
    }
}

/// Language codes that tag more than one alias in `names`, with the ids of
/// the offending names.
pub(crate) fn duplicate_languages(names: &[Name]) -> Vec<(EcoString, Vec<NodeId>)> {
    let mut duplicates: Vec<(EcoString, Vec<NodeId>)> = Vec::new();
    for (index, name) in names.iter().enumerate() {
        let Some(language) = name.language() else {
            continue;
        };
        if duplicates.iter().any(|(code, _)| code == language) {
            continue;
        }
        let ids: Vec<NodeId> = names[index..]
            .iter()
            .filter(|other| other.language() == Some(language))
            .map(|other| other.id)
            .collect();
        if ids.len() > 1 {
            duplicates.push((language.into(), ids));
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn duplicate_languages_groups_names() {
        let names = vec![
            Name::localized("cat", "en"),
            Name::localized("gato", "es"),
            Name::localized("kitty", "en"),
            Name::new("🐈"),
        ];

        let duplicates = duplicate_languages(&names);

        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].0, "en");
        assert_eq!(duplicates[0].1, vec![names[0].id, names[2].id]);
    }

    #[test]
    fn distinct_languages_are_fine() {
        let names = vec![Name::localized("cat", "en"), Name::localized("gato", "es")];
        assert!(duplicate_languages(&names).is_empty());
    }
}
