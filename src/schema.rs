table! {
    appointments (id) {
        id -> Unsigned<Bigint>,
        service -> Varchar,
        name -> Varchar,
        phone -> Varchar,
        date -> Char,
        time -> Varchar,
        status -> Varchar,
        number_of_people -> Integer,
        email -> Varchar,
    }
}
