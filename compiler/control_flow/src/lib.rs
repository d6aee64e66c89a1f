//! Control flow graphs of lowered bodies.
//!
//! A graph consists of basic blocks connected by branches. Basic blocks are maximal
//! runs of statements without internal jumps. Two empty sentinel blocks mark the
//! start and the end of the body.
//!
//! Branches whose condition is a boolean literal are folded when the graph is built
//! and blocks without incoming branches are pruned. The [`all_paths_return`] check
//! therefore ignores code that cannot be reached.

use hir::{BareExpression, Expression, Statement, Value};
use index_map::IndexMap;
use std::fmt;
use symbol::Label;
use utility::{displayed, HashMap};

#[cfg(test)]
mod test;

/// Whether every path through the lowered body ends in a `return` statement.
pub fn all_paths_return(statements: &[Statement]) -> bool {
    ControlFlowGraph::build(statements).all_paths_return()
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, index_map::Index)]
pub struct BlockIndex(u32);

#[derive(Debug)]
pub struct ControlFlowGraph {
    /// The blocks in source order. The first block is the start, the last one the end.
    pub blocks: IndexMap<BlockIndex, BasicBlock>,
    pub branches: Vec<Branch>,
}

impl ControlFlowGraph {
    /// Build the graph of a lowered body.
    ///
    /// # Panics
    ///
    /// Panics if the body contains structured statements or jumps to undeclared labels.
    pub fn build(statements: &[Statement]) -> Self {
        let mut builder = Builder::default();
        builder.partition(statements);
        builder.connect();
        builder.prune();
        builder.finish()
    }

    pub fn start(&self) -> BlockIndex {
        BlockIndex(0)
    }

    pub fn end(&self) -> BlockIndex {
        match self.blocks.last_index() {
            Some(index) => index,
            None => unreachable!("control flow graph without sentinel blocks"),
        }
    }

    pub fn incoming(&self, block: BlockIndex) -> impl Iterator<Item = &Branch> {
        self.branches.iter().filter(move |branch| branch.to == block)
    }

    pub fn outgoing(&self, block: BlockIndex) -> impl Iterator<Item = &Branch> {
        self.branches.iter().filter(move |branch| branch.from == block)
    }

    pub fn all_paths_return(&self) -> bool {
        self.incoming(self.end()).all(|branch| {
            matches!(
                self.blocks[branch.from].statements.last(),
                Some(Statement::Return(_))
            )
        })
    }

    /// Render the graph in the Graphviz DOT language.
    pub fn graphviz(&self) -> impl fmt::Display + '_ {
        displayed(move |f| {
            writeln!(f, "digraph G {{")?;

            for (index, block) in &self.blocks {
                let label = match block.kind {
                    BlockKind::Start => "<Start>".to_owned(),
                    BlockKind::End => "<End>".to_owned(),
                    BlockKind::Body => {
                        escape(&hir::display_statements(&block.statements).to_string())
                    }
                };
                writeln!(f, "    N{} [label = \"{label}\", shape = box]", index.0)?;
            }

            for branch in &self.branches {
                let label = match &branch.condition {
                    Some(condition) => escape(&condition.to_string()),
                    None => String::new(),
                };
                writeln!(
                    f,
                    "    N{} -> N{} [label = \"{label}\"]",
                    branch.from.0, branch.to.0
                )?;
            }

            writeln!(f, "}}")
        })
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\l")
}

#[derive(Debug)]
pub struct BasicBlock {
    pub kind: BlockKind,
    pub statements: Vec<Statement>,
}

impl BasicBlock {
    fn new(kind: BlockKind, statements: Vec<Statement>) -> Self {
        Self { kind, statements }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BlockKind {
    Start,
    End,
    Body,
}

/// An edge between two blocks.
#[derive(Debug)]
pub struct Branch {
    pub from: BlockIndex,
    pub to: BlockIndex,
    /// The condition under which the branch is taken. Absent if it is always taken.
    pub condition: Option<Condition>,
}

impl Branch {
    fn new(from: BlockIndex, to: BlockIndex, condition: Option<Condition>) -> Self {
        Self {
            from,
            to,
            condition,
        }
    }

    /// Fold a literal condition.
    ///
    /// Returns `None` if the branch is never taken.
    fn fold(self) -> Option<Self> {
        let constant = match &self.condition {
            Some(Condition {
                expression:
                    Expression {
                        bare: BareExpression::Literal(Value::Bool(value)),
                        ..
                    },
                holds,
            }) => Some(value == holds),
            _ => None,
        };

        match constant {
            Some(true) => Some(Self::new(self.from, self.to, None)),
            Some(false) => None,
            None => Some(self),
        }
    }
}

#[derive(Debug)]
pub struct Condition {
    pub expression: Expression,
    /// Whether the branch is taken if the expression holds or if it does not hold.
    pub holds: bool,
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.holds, &self.expression.bare) {
            (true, _) => write!(f, "{}", self.expression),
            (false, BareExpression::Binary(_) | BareExpression::Assignment(_)) => {
                write!(f, "!({})", self.expression)
            }
            (false, _) => write!(f, "!{}", self.expression),
        }
    }
}

#[derive(Default)]
struct Builder {
    blocks: IndexMap<BlockIndex, BasicBlock>,
    branches: Vec<Branch>,
}

impl Builder {
    /// Split the statements into blocks framed by the start and the end block.
    ///
    /// A new block starts before every label and after every jump and return.
    fn partition(&mut self, statements: &[Statement]) {
        self.blocks.insert(BasicBlock::new(BlockKind::Start, Vec::new()));

        let mut current = Vec::new();

        for statement in statements {
            match statement {
                Statement::Label(_) => {
                    if !current.is_empty() {
                        self.push_block(std::mem::take(&mut current));
                    }
                    current.push(statement.clone());
                }
                Statement::Goto(_) | Statement::ConditionalGoto(_) | Statement::Return(_) => {
                    current.push(statement.clone());
                    self.push_block(std::mem::take(&mut current));
                }
                Statement::VariableDeclaration(_) | Statement::Expression(_) => {
                    current.push(statement.clone());
                }
                Statement::Block(_)
                | Statement::If(_)
                | Statement::While(_)
                | Statement::DoWhile(_)
                | Statement::For(_) => {
                    unreachable!("structured statement in a lowered body: {statement}")
                }
            }
        }

        if !current.is_empty() {
            self.push_block(current);
        }

        self.blocks.insert(BasicBlock::new(BlockKind::End, Vec::new()));
    }

    fn push_block(&mut self, statements: Vec<Statement>) {
        self.blocks.insert(BasicBlock::new(BlockKind::Body, statements));
    }

    fn connect(&mut self) {
        let labels: HashMap<Label, BlockIndex> = self
            .blocks
            .iter()
            .filter_map(|(index, block)| match block.statements.first() {
                Some(&Statement::Label(label)) => Some((label, index)),
                _ => None,
            })
            .collect();
        let target = |label: &Label| match labels.get(label) {
            Some(&block) => block,
            None => unreachable!("jump to the undeclared label {label}"),
        };
        let end = self.blocks.last_index().unwrap_or(BlockIndex(0));

        let mut branches = Vec::new();

        for (from, block) in &self.blocks {
            let next = BlockIndex(from.0 + 1);

            match block.kind {
                BlockKind::Start => branches.push(Branch::new(from, next, None)),
                BlockKind::End => {}
                BlockKind::Body => match block.statements.last() {
                    Some(Statement::Goto(label)) => {
                        branches.push(Branch::new(from, target(label), None));
                    }
                    Some(Statement::ConditionalGoto(goto)) => {
                        let condition = |holds| Condition {
                            expression: goto.condition.clone(),
                            holds,
                        };

                        branches.push(Branch::new(
                            from,
                            target(&goto.label),
                            Some(condition(goto.jump_if_true)),
                        ));
                        branches.push(Branch::new(
                            from,
                            next,
                            Some(condition(!goto.jump_if_true)),
                        ));
                    }
                    Some(Statement::Return(_)) => branches.push(Branch::new(from, end, None)),
                    _ => branches.push(Branch::new(from, next, None)),
                },
            }
        }

        self.branches = branches.into_iter().filter_map(Branch::fold).collect();
    }

    /// Remove body blocks without incoming branches until there are none left.
    fn prune(&mut self) {
        let mut removed = vec![false; self.blocks.len()];

        loop {
            let dead = self.blocks.iter().find(|&(index, block)| {
                block.kind == BlockKind::Body
                    && !removed[index.0 as usize]
                    && !self.branches.iter().any(|branch| branch.to == index)
            });
            let Some((index, _)) = dead else {
                break;
            };

            removed[index.0 as usize] = true;
            self.branches.retain(|branch| branch.from != index);
        }

        let mapping = self.blocks.retain(|index, _| !removed[index.0 as usize]);
        let remap = |index: BlockIndex| match mapping[index.0 as usize] {
            Some(index) => index,
            None => unreachable!("branch from or to a pruned block"),
        };

        for branch in &mut self.branches {
            branch.from = remap(branch.from);
            branch.to = remap(branch.to);
        }
    }

    fn finish(self) -> ControlFlowGraph {
        ControlFlowGraph {
            blocks: self.blocks,
            branches: self.branches,
        }
    }
}
