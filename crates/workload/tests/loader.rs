mod common;

use common::{prepare, query_int, reference_config};
use tpcc_workload::loader;
use tpcc_workload::schema::CREATE_INDEXES;

#[test]
fn test_reference_accepts_index_ddl() {
    let dir = tempfile::tempdir().unwrap();
    let config = reference_config(dir.path(), 3);
    let mut client = prepare(&config);

    loader::create_indexes(&mut client).unwrap();
    // Re-running on a prepared database is harmless.
    loader::create_indexes(&mut client).unwrap();

    let indexes = query_int(
        &mut client,
        "select count(*) from sqlite_master where type='index' and name like 'idx_%';",
    );
    assert_eq!(indexes, CREATE_INDEXES.len() as i64);
    let stock = query_int(
        &mut client,
        "select count(*) from sqlite_master \
         where type='index' and name='idx_stock_s_w_id_s_i_id' and tbl_name='stock';",
    );
    assert_eq!(stock, 1);
    assert!(loader::count_star(&mut client, &config.scale).unwrap());
}
