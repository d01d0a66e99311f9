//! LL(1) grammar table for Klein
//!
//! The parser only needs an already-materialised mapping from
//! `(nonterminal, lookahead)` to a production. [`GrammarTable::klein`] builds
//! the table for the Klein language; other tables can be assembled with
//! [`GrammarTable::insert`].

use crate::scanner::token::TokenKind;
use rustc_hash::FxHashMap;
use std::fmt;

/// Nonterminals of the Klein grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NonTerminal {
    Program,
    DefinitionList,
    Definition,
    ParameterList,
    FormalParameters,
    FormalParametersRest,
    IdWithType,
    Type,
    Body,
    PrintExpression,
    Expression,
    ExpressionRest,
    SimpleExpression,
    SimpleExpressionRest,
    Term,
    TermRest,
    Factor,
    FactorRest,
    ArgumentList,
    FormalArguments,
    FormalArgumentsRest,
    Literal,
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NonTerminal::Program => "PROGRAM",
            NonTerminal::DefinitionList => "DEFINITION_LIST",
            NonTerminal::Definition => "DEFINITION",
            NonTerminal::ParameterList => "PARAMETER_LIST",
            NonTerminal::FormalParameters => "FORMAL_PARAMETERS",
            NonTerminal::FormalParametersRest => "FORMAL_PARAMETERS_REST",
            NonTerminal::IdWithType => "ID_WITH_TYPE",
            NonTerminal::Type => "TYPE",
            NonTerminal::Body => "BODY",
            NonTerminal::PrintExpression => "PRINT_EXPRESSION",
            NonTerminal::Expression => "EXPRESSION",
            NonTerminal::ExpressionRest => "EXPRESSION_REST",
            NonTerminal::SimpleExpression => "SIMPLE_EXPRESSION",
            NonTerminal::SimpleExpressionRest => "SIMPLE_EXPRESSION_REST",
            NonTerminal::Term => "TERM",
            NonTerminal::TermRest => "TERM_REST",
            NonTerminal::Factor => "FACTOR",
            NonTerminal::FactorRest => "FACTOR_REST",
            NonTerminal::ArgumentList => "ARGUMENT_LIST",
            NonTerminal::FormalArguments => "FORMAL_ARGUMENTS",
            NonTerminal::FormalArgumentsRest => "FORMAL_ARGUMENTS_REST",
            NonTerminal::Literal => "LITERAL",
        };
        f.write_str(name)
    }
}

/// Node constructors the parser runs between grammar symbols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemanticAction {
    MakeProgram,
    MakeDefinitionList,
    MakeDefinition,
    MakeIdentifier,
    MakeParameterList,
    MakeIdWithType,
    MakeIntegerType,
    MakeBooleanType,
    MakeBody,
    MakeFunctionCall,
    MakeEquals,
    MakeLessThan,
    MakeOr,
    MakePlus,
    MakeMinus,
    MakeTimes,
    MakeDivide,
    MakeAnd,
    MakeNot,
    MakeUnaryMinus,
    MakeIf,
    MakeArgumentList,
    MakeArgument,
    MakeIntegerLiteral,
    MakeBooleanLiteral,
}

/// One entry of a production's right-hand side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrammarSymbol {
    Terminal(TokenKind),
    NonTerminal(NonTerminal),
    Action(SemanticAction),
}

impl fmt::Display for GrammarSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarSymbol::Terminal(kind) => write!(f, "{}", kind),
            GrammarSymbol::NonTerminal(nonterminal) => write!(f, "{}", nonterminal),
            GrammarSymbol::Action(action) => write!(f, "{:?}", action),
        }
    }
}

pub type Production = Vec<GrammarSymbol>;

/// Mapping from `(nonterminal, lookahead)` to the production to expand
#[derive(Debug, Clone)]
pub struct GrammarTable {
    start: NonTerminal,
    rules: FxHashMap<(NonTerminal, TokenKind), Production>,
}

impl GrammarTable {
    pub fn new(start: NonTerminal) -> Self {
        Self {
            start,
            rules: FxHashMap::default(),
        }
    }

    pub fn start(&self) -> NonTerminal {
        self.start
    }

    /// Add a rule, returning the production it replaced, if any.
    pub fn insert(
        &mut self,
        nonterminal: NonTerminal,
        lookahead: TokenKind,
        production: Production,
    ) -> Option<Production> {
        self.rules.insert((nonterminal, lookahead), production)
    }

    pub fn lookup(&self, nonterminal: NonTerminal, lookahead: TokenKind) -> Option<&[GrammarSymbol]> {
        self.rules
            .get(&(nonterminal, lookahead))
            .map(|production| production.as_slice())
    }

    /// Every lookahead with a rule for `nonterminal`, in token-kind order.
    pub fn expected_terminals(&self, nonterminal: NonTerminal) -> Vec<TokenKind> {
        TokenKind::ALL
            .iter()
            .copied()
            .filter(|kind| self.rules.contains_key(&(nonterminal, *kind)))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The Klein grammar.
    ///
    /// Binary operators use right-recursive `*_REST` productions with the
    /// node action placed after the right operand, so operators of one level
    /// associate to the left. Precedence from loosest to tightest: `<` `=`,
    /// then `or` `+` `-`, then `and` `*` `/`, then unary operators and atoms.
    pub fn klein() -> Self {
        use GrammarSymbol::{Action as A, NonTerminal as N, Terminal as T};
        use NonTerminal as NT;
        use SemanticAction as SA;
        use TokenKind as TK;

        let mut table = GrammarTable::new(NT::Program);

        // Lookaheads that can start an expression
        let expression_start = [
            TK::KeywordIf,
            TK::KeywordNot,
            TK::Integer,
            TK::Boolean,
            TK::Minus,
            TK::Identifier,
            TK::LeftParen,
        ];
        // Lookaheads that can follow a complete expression
        let expression_end = [
            TK::KeywordFunction,
            TK::EndOfFile,
            TK::RightParen,
            TK::KeywordThen,
            TK::KeywordElse,
            TK::Comma,
        ];
        let relational = [TK::LessThan, TK::Equal];
        let additive = [TK::KeywordOr, TK::Plus, TK::Minus];
        let multiplicative = [TK::KeywordAnd, TK::Times, TK::Divide];

        let mut rule = |nonterminal: NT, lookaheads: &[TK], production: Production| {
            for lookahead in lookaheads {
                table.insert(nonterminal, *lookahead, production.clone());
            }
        };

        rule(
            NT::Program,
            &[TK::KeywordFunction, TK::EndOfFile],
            vec![N(NT::DefinitionList), A(SA::MakeDefinitionList), A(SA::MakeProgram)],
        );

        rule(
            NT::DefinitionList,
            &[TK::KeywordFunction],
            vec![N(NT::Definition), N(NT::DefinitionList)],
        );
        rule(NT::DefinitionList, &[TK::EndOfFile], vec![]);

        rule(
            NT::Definition,
            &[TK::KeywordFunction],
            vec![
                T(TK::KeywordFunction),
                T(TK::Identifier),
                A(SA::MakeIdentifier),
                T(TK::LeftParen),
                N(NT::ParameterList),
                T(TK::RightParen),
                T(TK::Colon),
                N(NT::Type),
                N(NT::Body),
                A(SA::MakeDefinition),
            ],
        );

        rule(
            NT::ParameterList,
            &[TK::Identifier],
            vec![N(NT::FormalParameters), A(SA::MakeParameterList)],
        );
        rule(
            NT::ParameterList,
            &[TK::RightParen],
            vec![A(SA::MakeParameterList)],
        );

        rule(
            NT::FormalParameters,
            &[TK::Identifier],
            vec![N(NT::IdWithType), N(NT::FormalParametersRest)],
        );
        rule(
            NT::FormalParametersRest,
            &[TK::Comma],
            vec![T(TK::Comma), N(NT::FormalParameters)],
        );
        rule(NT::FormalParametersRest, &[TK::RightParen], vec![]);

        rule(
            NT::IdWithType,
            &[TK::Identifier],
            vec![
                T(TK::Identifier),
                A(SA::MakeIdentifier),
                T(TK::Colon),
                N(NT::Type),
                A(SA::MakeIdWithType),
            ],
        );

        rule(
            NT::Type,
            &[TK::KeywordInteger],
            vec![T(TK::KeywordInteger), A(SA::MakeIntegerType)],
        );
        rule(
            NT::Type,
            &[TK::KeywordBoolean],
            vec![T(TK::KeywordBoolean), A(SA::MakeBooleanType)],
        );

        rule(
            NT::Body,
            &[TK::KeywordPrint],
            vec![N(NT::PrintExpression), N(NT::Body)],
        );
        rule(
            NT::Body,
            &expression_start,
            vec![N(NT::Expression), A(SA::MakeBody)],
        );

        rule(
            NT::PrintExpression,
            &[TK::KeywordPrint],
            vec![
                T(TK::KeywordPrint),
                A(SA::MakeIdentifier),
                T(TK::LeftParen),
                N(NT::Expression),
                A(SA::MakeArgument),
                A(SA::MakeArgumentList),
                T(TK::RightParen),
                A(SA::MakeFunctionCall),
            ],
        );

        rule(
            NT::Expression,
            &expression_start,
            vec![N(NT::SimpleExpression), N(NT::ExpressionRest)],
        );
        rule(
            NT::ExpressionRest,
            &[TK::LessThan],
            vec![
                T(TK::LessThan),
                N(NT::SimpleExpression),
                A(SA::MakeLessThan),
                N(NT::ExpressionRest),
            ],
        );
        rule(
            NT::ExpressionRest,
            &[TK::Equal],
            vec![
                T(TK::Equal),
                N(NT::SimpleExpression),
                A(SA::MakeEquals),
                N(NT::ExpressionRest),
            ],
        );
        rule(NT::ExpressionRest, &expression_end, vec![]);

        rule(
            NT::SimpleExpression,
            &expression_start,
            vec![N(NT::Term), N(NT::SimpleExpressionRest)],
        );
        for (operator, action) in [
            (TK::KeywordOr, SA::MakeOr),
            (TK::Plus, SA::MakePlus),
            (TK::Minus, SA::MakeMinus),
        ] {
            rule(
                NT::SimpleExpressionRest,
                &[operator],
                vec![T(operator), N(NT::Term), A(action), N(NT::SimpleExpressionRest)],
            );
        }
        rule(NT::SimpleExpressionRest, &expression_end, vec![]);
        rule(NT::SimpleExpressionRest, &relational, vec![]);

        rule(
            NT::Term,
            &expression_start,
            vec![N(NT::Factor), N(NT::TermRest)],
        );
        for (operator, action) in [
            (TK::KeywordAnd, SA::MakeAnd),
            (TK::Times, SA::MakeTimes),
            (TK::Divide, SA::MakeDivide),
        ] {
            rule(
                NT::TermRest,
                &[operator],
                vec![T(operator), N(NT::Factor), A(action), N(NT::TermRest)],
            );
        }
        rule(NT::TermRest, &expression_end, vec![]);
        rule(NT::TermRest, &relational, vec![]);
        rule(NT::TermRest, &additive, vec![]);

        rule(
            NT::Factor,
            &[TK::KeywordIf],
            vec![
                T(TK::KeywordIf),
                N(NT::Expression),
                T(TK::KeywordThen),
                N(NT::Expression),
                T(TK::KeywordElse),
                N(NT::Expression),
                A(SA::MakeIf),
            ],
        );
        rule(
            NT::Factor,
            &[TK::KeywordNot],
            vec![T(TK::KeywordNot), N(NT::Factor), A(SA::MakeNot)],
        );
        rule(
            NT::Factor,
            &[TK::Integer, TK::Boolean],
            vec![N(NT::Literal)],
        );
        rule(
            NT::Factor,
            &[TK::Minus],
            vec![T(TK::Minus), N(NT::Factor), A(SA::MakeUnaryMinus)],
        );
        rule(
            NT::Factor,
            &[TK::Identifier],
            vec![T(TK::Identifier), A(SA::MakeIdentifier), N(NT::FactorRest)],
        );
        rule(
            NT::Factor,
            &[TK::LeftParen],
            vec![T(TK::LeftParen), N(NT::Expression), T(TK::RightParen)],
        );

        rule(
            NT::FactorRest,
            &[TK::LeftParen],
            vec![
                T(TK::LeftParen),
                N(NT::ArgumentList),
                T(TK::RightParen),
                A(SA::MakeFunctionCall),
            ],
        );
        rule(NT::FactorRest, &expression_end, vec![]);
        rule(NT::FactorRest, &relational, vec![]);
        rule(NT::FactorRest, &additive, vec![]);
        rule(NT::FactorRest, &multiplicative, vec![]);

        rule(
            NT::ArgumentList,
            &expression_start,
            vec![N(NT::FormalArguments), A(SA::MakeArgumentList)],
        );
        rule(
            NT::ArgumentList,
            &[TK::RightParen],
            vec![A(SA::MakeArgumentList)],
        );

        rule(
            NT::FormalArguments,
            &expression_start,
            vec![
                N(NT::Expression),
                A(SA::MakeArgument),
                N(NT::FormalArgumentsRest),
            ],
        );
        rule(
            NT::FormalArgumentsRest,
            &[TK::Comma],
            vec![T(TK::Comma), N(NT::FormalArguments)],
        );
        rule(NT::FormalArgumentsRest, &[TK::RightParen], vec![]);

        rule(
            NT::Literal,
            &[TK::Integer],
            vec![T(TK::Integer), A(SA::MakeIntegerLiteral)],
        );
        rule(
            NT::Literal,
            &[TK::Boolean],
            vec![T(TK::Boolean), A(SA::MakeBooleanLiteral)],
        );

        table
    }
}
