use std::fmt;

/// A whitespace-separated word, tagged with where it was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Word outside any double-quoted run
    Word(String),
    /// Word inside a closed, non-empty double-quoted run
    Quoted(String),
}

impl Token {
    pub fn text(&self) -> &str {
        match self {
            Token::Word(s) | Token::Quoted(s) => s,
        }
    }

    pub fn as_quoted(&self) -> Option<&str> {
        match self {
            Token::Quoted(s) => Some(s),
            Token::Word(_) => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Word(s) => write!(f, "{}", s),
            Token::Quoted(s) => write!(f, "\"{}\"", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Bare,
    Quoted,
}

/// Splits a pattern body into words, tracking double-quoted runs.
///
/// A quoted run only counts once its closing quote is seen and it holds at
/// least one character. `""` does not close anything: the second quote
/// reopens the run. Words of an unterminated run are dropped. There is no
/// escaping and no nesting.
pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
    mode: Mode,
    /// Word being accumulated
    word: String,
    /// Words of the quoted run in progress
    run: Vec<String>,
    /// Characters seen since the run opened
    run_chars: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    /// Create a new lexer for the given input
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Lexer {
            input: chars,
            position: 0,
            current_char,
            mode: Mode::Bare,
            word: String::new(),
            run: Vec::new(),
            run_chars: 0,
            tokens: Vec::new(),
        }
    }

    /// Advance to the next character
    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    /// Consume the whole input
    pub fn tokenize(mut self) -> Vec<Token> {
        while let Some(ch) = self.current_char {
            match self.mode {
                Mode::Bare => self.bare(ch),
                Mode::Quoted => self.quoted(ch),
            }
            self.advance();
        }

        if self.mode == Mode::Bare {
            self.finish_word();
        }
        self.tokens
    }

    fn bare(&mut self, ch: char) {
        if ch == '"' {
            self.finish_word();
            self.mode = Mode::Quoted;
            self.run.clear();
            self.run_chars = 0;
        } else if ch.is_whitespace() {
            self.finish_word();
        } else {
            self.word.push(ch);
        }
    }

    fn quoted(&mut self, ch: char) {
        if ch == '"' {
            if self.run_chars == 0 {
                return;
            }
            self.finish_word();
            self.tokens.extend(self.run.drain(..).map(Token::Quoted));
            self.mode = Mode::Bare;
            return;
        }

        self.run_chars += 1;
        if ch.is_whitespace() {
            self.finish_word();
        } else {
            self.word.push(ch);
        }
    }

    fn finish_word(&mut self) {
        if self.word.is_empty() {
            return;
        }
        let word = std::mem::take(&mut self.word);
        match self.mode {
            Mode::Bare => self.tokens.push(Token::Word(word)),
            Mode::Quoted => self.run.push(word),
        }
    }
}
