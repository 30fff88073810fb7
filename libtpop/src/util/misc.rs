/// Asserts that `$e` matches `$p`. Variables bound by the pattern stay in scope afterwards.
macro_rules! assert_matches {
    ($e:expr, $p:pat) => {
        let $p = $e else {
            panic!("`{}` does not match `{}`", stringify!($e), stringify!($p));
        };
    };
}

pub(crate) use assert_matches;
