use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOpType {
    Multiplication,
    Division,
    Remainder,
    Addition,
    Subtraction,
    Concat,
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
    And,
    Or,
}

impl BinaryOpType {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOpType::Equal
                | BinaryOpType::NotEqual
                | BinaryOpType::Less
                | BinaryOpType::Greater
                | BinaryOpType::LessEqual
                | BinaryOpType::GreaterEqual
        )
    }
    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOpType::And | BinaryOpType::Or)
    }
    /// The operator obtained by swapping the operands.
    pub fn mirrored(&self) -> BinaryOpType {
        match self {
            BinaryOpType::Less => BinaryOpType::Greater,
            BinaryOpType::Greater => BinaryOpType::Less,
            BinaryOpType::LessEqual => BinaryOpType::GreaterEqual,
            BinaryOpType::GreaterEqual => BinaryOpType::LessEqual,
            v => *v,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOpType {
    Negative,
    Not,
}

/// Functions understood by every dialect, plus raw custom calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Function {
    Count,
    CountDistinct,
    Sum,
    Avg,
    Min,
    Max,
    Upper,
    Lower,
    Trim,
    Length,
    Coalesce,
    StartsWith,
    EndsWith,
    Contains,
    Custom(Cow<'static, str>),
}

impl Function {
    pub fn is_aggregate(&self) -> bool {
        matches!(
            self,
            Function::Count
                | Function::CountDistinct
                | Function::Sum
                | Function::Avg
                | Function::Min
                | Function::Max
        )
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    #[default]
    Asc,
    Desc,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    #[default]
    Inner,
    Left,
    Right,
    Cross,
}
