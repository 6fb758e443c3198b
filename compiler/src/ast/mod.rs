//! Syntax tree handed to the compiler by the parser.
//!
//! Nodes derive serde traits so a tree can travel as JSON, e.g.
//! `{"Program":[{"ExpressionStatement":{"Integer":5}}]}`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AstNode {
    // Program root
    Program(Vec<AstNode>),

    // Statements
    Block(Vec<AstNode>),
    ExpressionStatement(Box<AstNode>),
    Let {
        name: String,
        value: Box<AstNode>,
    },
    Return(Box<AstNode>),

    // Literals
    Identifier(String),
    Integer(i64),
    Boolean(bool),
    String(String),
    Array(Vec<AstNode>),
    Hash(Vec<(AstNode, AstNode)>),

    // Expressions
    Prefix {
        operator: String,
        operand: Box<AstNode>,
    },
    Infix {
        left: Box<AstNode>,
        operator: String,
        right: Box<AstNode>,
    },
    If {
        condition: Box<AstNode>,
        consequence: Box<AstNode>,
        alternative: Option<Box<AstNode>>,
    },
    Index {
        collection: Box<AstNode>,
        index: Box<AstNode>,
    },
    Function {
        parameters: Vec<String>,
        body: Box<AstNode>,
    },
    Call {
        function: Box<AstNode>,
        arguments: Vec<AstNode>,
    },
}

impl AstNode {
    /// Node kind as it appears in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            AstNode::Program(_) => "Program",
            AstNode::Block(_) => "BlockStatement",
            AstNode::ExpressionStatement(_) => "ExpressionStatement",
            AstNode::Let { .. } => "LetStatement",
            AstNode::Return(_) => "ReturnStatement",
            AstNode::Identifier(_) => "Identifier",
            AstNode::Integer(_) => "IntegerLiteral",
            AstNode::Boolean(_) => "BooleanLiteral",
            AstNode::String(_) => "StringLiteral",
            AstNode::Array(_) => "ArrayLiteral",
            AstNode::Hash(_) => "HashLiteral",
            AstNode::Prefix { .. } => "PrefixExpression",
            AstNode::Infix { .. } => "InfixExpression",
            AstNode::If { .. } => "IfExpression",
            AstNode::Index { .. } => "IndexExpression",
            AstNode::Function { .. } => "FunctionLiteral",
            AstNode::Call { .. } => "CallExpression",
        }
    }

    pub fn program(statements: Vec<AstNode>) -> Self {
        AstNode::Program(statements)
    }

    pub fn block(statements: Vec<AstNode>) -> Self {
        AstNode::Block(statements)
    }

    /// Wrap an expression as a statement
    pub fn statement(expression: AstNode) -> Self {
        AstNode::ExpressionStatement(Box::new(expression))
    }

    pub fn let_statement(name: &str, value: AstNode) -> Self {
        AstNode::Let {
            name: name.to_string(),
            value: Box::new(value),
        }
    }

    pub fn identifier(name: &str) -> Self {
        AstNode::Identifier(name.to_string())
    }

    pub fn string(value: &str) -> Self {
        AstNode::String(value.to_string())
    }

    pub fn prefix(operator: &str, operand: AstNode) -> Self {
        AstNode::Prefix {
            operator: operator.to_string(),
            operand: Box::new(operand),
        }
    }

    pub fn infix(left: AstNode, operator: &str, right: AstNode) -> Self {
        AstNode::Infix {
            left: Box::new(left),
            operator: operator.to_string(),
            right: Box::new(right),
        }
    }

    pub fn if_expression(condition: AstNode, consequence: AstNode, alternative: Option<AstNode>) -> Self {
        AstNode::If {
            condition: Box::new(condition),
            consequence: Box::new(consequence),
            alternative: alternative.map(Box::new),
        }
    }

    pub fn index(collection: AstNode, index: AstNode) -> Self {
        AstNode::Index {
            collection: Box::new(collection),
            index: Box::new(index),
        }
    }
}
