//! Node and token kinds of the lossless syntax tree.

/// Kind of a green node or token.
///
/// Unit kinds are the direct children of [`SyntaxKind::Document`]; every
/// other kind appears nested inside a unit.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum SyntaxKind {
    // Root
    Document,

    // Units
    Blank,
    Comment,
    Include,
    VarDecl,
    ConstDecl,
    ListDecl,
    KnotHeader,
    StitchHeader,
    Choice,
    Gather,
    Divert,
    Logic,
    Define,
    TextLine,

    // Inner nodes
    Label,
    Condition,
    ChoiceOnly,
    DivertClause,
    AssetRef,
    AudioRef,
    InlineExpr,
    DefineHeader,
    Property,
    LineComment,

    // Tokens
    Whitespace,
    Newline,
    Marker,
    Arrow,
    Keyword,
    Name,
    Params,
    LabelName,
    Punct,
    Text,
    Expression,
    DivertTarget,
    AssetName,
    Path,
    ListItems,
    DefineType,
    DefineName,
    PropertyPath,
    Value,
    CommentText,
    Error,
}

impl SyntaxKind {
    /// Kinds that appear as direct children of the document.
    pub fn is_unit(self) -> bool {
        matches!(
            self,
            SyntaxKind::Blank
                | SyntaxKind::Comment
                | SyntaxKind::Include
                | SyntaxKind::VarDecl
                | SyntaxKind::ConstDecl
                | SyntaxKind::ListDecl
                | SyntaxKind::KnotHeader
                | SyntaxKind::StitchHeader
                | SyntaxKind::Choice
                | SyntaxKind::Gather
                | SyntaxKind::Divert
                | SyntaxKind::Logic
                | SyntaxKind::Define
                | SyntaxKind::TextLine
        )
    }

    /// Leaf kinds, which carry text but no children.
    pub fn is_token(self) -> bool {
        self >= SyntaxKind::Whitespace
    }

    /// Units that carry no narrative content and lower to nothing.
    pub fn is_trivia_unit(self) -> bool {
        matches!(self, SyntaxKind::Blank | SyntaxKind::Comment)
    }
}
