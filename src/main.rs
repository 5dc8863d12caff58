use deploylat::error::AppResult;

fn main() -> AppResult<()> {
    deploylat::entry::run()
}
