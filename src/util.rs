/// cond が偽なら err を返して早期 return する。
macro_rules! chk {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return ::std::result::Result::Err($err);
        }
    };
}
