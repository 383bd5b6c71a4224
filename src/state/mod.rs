pub mod game_board;

pub use game_board::GameBoard;
